//! Coupon redemption and point balances.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{CouponRepository, CouponRepositoryError, CouponWallet};
use crate::domain::{Coupon, CouponCode, Error, Redemption, UserId};

const COUPON_NOT_FOUND: &str = "Coupon not found";
const USER_NOT_FOUND: &str = "User not found";

fn map_coupon_error(error: CouponRepositoryError) -> Error {
    match error {
        CouponRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("coupon repository unavailable: {message}"))
        }
        CouponRepositoryError::Query { message } => {
            Error::internal(format!("coupon repository error: {message}"))
        }
        err @ CouponRepositoryError::AlreadyUsed { .. } => Error::conflict(err.to_string()),
        CouponRepositoryError::UserNotFound { .. } => Error::not_found(USER_NOT_FOUND),
    }
}

/// Coupon service implementing [`CouponWallet`].
#[derive(Clone)]
pub struct CouponService<C> {
    coupons: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C> CouponService<C> {
    pub fn new(coupons: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { coupons, clock }
    }
}

#[async_trait]
impl<C> CouponWallet for CouponService<C>
where
    C: CouponRepository,
{
    async fn available(&self) -> Result<Vec<Coupon>, Error> {
        self.coupons.available().await.map_err(map_coupon_error)
    }

    async fn redeem(&self, code: &CouponCode, user: UserId) -> Result<Redemption, Error> {
        let coupon = self
            .coupons
            .find_by_code(code)
            .await
            .map_err(map_coupon_error)?
            .ok_or_else(|| Error::not_found(COUPON_NOT_FOUND))?;
        if coupon.is_used {
            return Err(map_coupon_error(CouponRepositoryError::already_used(
                code.as_str(),
            )));
        }

        let new_points = self
            .coupons
            .redeem(&coupon, user, self.clock.utc())
            .await
            .map_err(map_coupon_error)?;
        info!(coupon = code.as_str(), user_id = %user, points = coupon.points, "coupon redeemed");
        Ok(Redemption::new(coupon.points, new_points))
    }

    async fn points(&self, user: UserId) -> Result<i32, Error> {
        self.coupons
            .user_points(user)
            .await
            .map_err(map_coupon_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}
