//! PostgreSQL-backed coupon wallet storage.
//!
//! Redemption marks the coupon used with a conditional update, so of two
//! concurrent redemptions exactly one succeeds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::info;

use crate::domain::ports::{CouponRepository, CouponRepositoryError};
use crate::domain::{Coupon, CouponCode, UserId};

use super::error_mapping::{classify, map_basic};
use super::models::CouponRow;
use super::pool::{DbPool, PoolError};
use super::schema::{coupons, users};

/// Diesel-backed implementation of the coupon repository port.
#[derive(Clone)]
pub struct DieselCouponRepository {
    pool: DbPool,
}

impl DieselCouponRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    AlreadyUsed(String),
    UserNotFound(i32),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> CouponRepositoryError {
    CouponRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> CouponRepositoryError {
    map_basic(
        classify(error),
        CouponRepositoryError::connection,
        CouponRepositoryError::query,
    )
}

fn map_tx_error(error: TxError) -> CouponRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::AlreadyUsed(code) => CouponRepositoryError::already_used(code),
        TxError::UserNotFound(user_id) => CouponRepositoryError::user_not_found(user_id),
    }
}

fn into_coupon(row: CouponRow) -> Result<Coupon, CouponRepositoryError> {
    Coupon::try_from(row).map_err(|err| CouponRepositoryError::query(err.to_string()))
}

#[async_trait]
impl CouponRepository for DieselCouponRepository {
    async fn available(&self) -> Result<Vec<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CouponRow> = coupons::table
            .filter(coupons::is_used.eq(false))
            .select(CouponRow::as_select())
            .order((coupons::points.asc(), coupons::coupon_code.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(into_coupon).collect()
    }

    async fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<Coupon>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CouponRow> = coupons::table
            .filter(coupons::coupon_code.eq(code.as_str()))
            .select(CouponRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(into_coupon).transpose()
    }

    async fn redeem(
        &self,
        coupon: &Coupon,
        user: UserId,
        used_at: DateTime<Utc>,
    ) -> Result<i32, CouponRepositoryError> {
        let coupon_id = coupon.id;
        let points = coupon.points;
        let code = coupon.coupon_code.as_str().to_owned();
        let user_id = user.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let balance = conn
            .transaction(|conn| {
                async move {
                    let marked = diesel::update(
                        coupons::table
                            .find(coupon_id)
                            .filter(coupons::is_used.eq(false)),
                    )
                    .set((
                        coupons::is_used.eq(true),
                        coupons::used_by_mbr_id.eq(Some(user_id)),
                        coupons::used_at.eq(Some(used_at)),
                        coupons::updated_at.eq(used_at),
                    ))
                    .execute(conn)
                    .await?;
                    if marked == 0 {
                        return Err(TxError::AlreadyUsed(code));
                    }

                    let balance: Option<i32> = diesel::update(users::table.find(user_id))
                        .set(users::point.eq(users::point + points))
                        .returning(users::point)
                        .get_result(conn)
                        .await
                        .optional()?;
                    balance.ok_or(TxError::UserNotFound(user_id))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        info!(user_id, coupon_id, points, balance, "coupon redeemed");
        Ok(balance)
    }

    async fn user_points(&self, user: UserId) -> Result<Option<i32>, CouponRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(user.get())
            .select(users::point)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TxError::AlreadyUsed("POINT100-001".to_owned()), CouponRepositoryError::already_used("POINT100-001"))]
    #[case(TxError::UserNotFound(3), CouponRepositoryError::user_not_found(3))]
    fn transaction_failures_map_to_port_variants(
        #[case] error: TxError,
        #[case] expected: CouponRepositoryError,
    ) {
        assert_eq!(map_tx_error(error), expected);
    }
}
