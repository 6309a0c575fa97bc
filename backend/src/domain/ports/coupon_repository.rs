//! Port abstraction for coupons and point balances.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Coupon, CouponCode, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by coupon repository adapters.
    pub enum CouponRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "coupon repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "coupon repository query failed: {message}",
        /// The coupon was redeemed first by someone else.
        AlreadyUsed { code: String } => "coupon {code} has already been used",
        /// The redeeming user does not exist.
        UserNotFound { user_id: i32 } => "user {user_id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Unused coupons, lowest value first.
    async fn available(&self) -> Result<Vec<Coupon>, CouponRepositoryError>;

    async fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<Coupon>, CouponRepositoryError>;

    /// Mark the coupon used and credit its points, atomically. The coupon
    /// update must be conditional on `is_used = false`. Returns the new
    /// balance.
    async fn redeem(
        &self,
        coupon: &Coupon,
        user: UserId,
        used_at: DateTime<Utc>,
    ) -> Result<i32, CouponRepositoryError>;

    /// Point balance, or `None` for an unknown user.
    async fn user_points(&self, user: UserId) -> Result<Option<i32>, CouponRepositoryError>;
}
