//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities for the Q&A application and the
//! services that implement its use-cases against driven ports. Inbound and
//! outbound adapters depend on this module; it depends on neither.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Question, Answer, Coupon and their validated inputs.
//! - `migrations`: registry, runner and diagnostic reports.
//! - `test_data`: reference-data seeder and validator.
//! - Services implementing the driving ports in [`ports`].

pub mod error;
pub mod migrations;
pub mod ports;
pub mod test_data;

mod accounts_service;
mod answer_service;
mod auth;
mod coupon;
mod coupon_service;
mod question;
mod question_service;
mod trace_id;
mod user;
mod users_service;

pub use self::accounts_service::AccountsService;
pub use self::answer_service::AnswerService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordHash, Registration};
pub use self::coupon::{COUPON_CODE_MAX, Coupon, CouponCode, CouponCodeError, Redemption};
pub use self::coupon_service::CouponService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::question::{
    Answer, AnswerContent, AnswerId, AnswerView, AuthorProfile, AuthorSummary,
    ContentValidationError, DESCRIPTION_MIN, PLACEHOLDER_IMAGE, Question, QuestionDetail,
    QuestionDraft, QuestionId, QuestionListing, QuestionPatch, TITLE_MAX, TITLE_MIN,
    UNKNOWN_AUTHOR, VoteDirection, sanitize_markup,
};
pub use self::question_service::{QUESTION_REWARD_POINTS, QuestionService};
pub use self::self_test::{SelfTestReport, full_self_test};
pub use self::trace_id::TraceId;
pub use self::user::{
    ContactDetails, LOGIN_ID_MAX, LoginId, NewUser, PHONE_MAX, Role, User, UserCounts, UserId,
    UserSummary, UserValidationError,
};
pub use self::users_service::{SEARCH_QUERY_MAX, UsersService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use qna_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
