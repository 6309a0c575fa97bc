//! Point coupons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserId;

/// Maximum coupon code length, matching `coupons.coupon_code`.
pub const COUPON_CODE_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponCodeError {
    #[error("coupon code must not be empty")]
    Empty,
    #[error("coupon code must be at most {max} characters")]
    TooLong { max: usize },
}

/// Coupon code, trimmed and upper-cased.
///
/// # Examples
/// ```
/// use qna_backend::domain::CouponCode;
///
/// let code = CouponCode::new(" point100-001 ").expect("valid code");
/// assert_eq!(code.as_str(), "POINT100-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(raw: &str) -> Result<Self, CouponCodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CouponCodeError::Empty);
        }
        if trimmed.chars().count() > COUPON_CODE_MAX {
            return Err(CouponCodeError::TooLong {
                max: COUPON_CODE_MAX,
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: i32,
    #[schema(value_type = String, example = "POINT100-001")]
    pub coupon_code: CouponCode,
    pub points: i32,
    pub is_used: bool,
    #[schema(value_type = Option<i32>)]
    pub used_by: Option<UserId>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub points_added: i32,
    pub new_points: i32,
    pub message: String,
}

impl Redemption {
    #[must_use]
    pub fn new(points_added: i32, new_points: i32) -> Self {
        Self {
            points_added,
            new_points,
            message: format!("{points_added} points have been added."),
        }
    }
}
