//! Driving port for coupon redemption and point balances.

use async_trait::async_trait;

use crate::domain::{Coupon, CouponCode, Error, Redemption, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponWallet: Send + Sync {
    /// Unused coupons, lowest value first.
    async fn available(&self) -> Result<Vec<Coupon>, Error>;

    /// Redeem `code` for `user`. A coupon can be redeemed once.
    async fn redeem(&self, code: &CouponCode, user: UserId) -> Result<Redemption, Error>;

    /// Current point balance.
    async fn points(&self, user: UserId) -> Result<i32, Error>;
}
