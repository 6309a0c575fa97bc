//! User data model.
//!
//! Users are keyed by a numeric member id assigned by the database and carry
//! a separate, unique login id chosen at registration.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::PasswordHash;

/// Maximum length of a login id, matching the `users.user_id` column.
pub const LOGIN_ID_MAX: usize = 255;
/// Maximum length of a phone number, matching the `users.phone` column.
pub const PHONE_MAX: usize = 20;
const TEXT_COLUMN_MAX: usize = 255;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("login id must not be empty")]
    EmptyLoginId,
    #[error("login id must be at most {max} characters")]
    LoginIdTooLong { max: usize },
    #[error("name must not be empty")]
    EmptyName,
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("phone number must not be empty")]
    EmptyPhone,
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Numeric member identifier (`users.mbr_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw database identifier.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique login id chosen by the user (`users.user_id`).
///
/// Surrounding whitespace is trimmed; the remainder must be non-empty and
/// fit the column.
///
/// # Examples
/// ```
/// use qna_backend::domain::LoginId;
///
/// let id = LoginId::new("  testuser1 ").expect("valid login id");
/// assert_eq!(id.as_ref(), "testuser1");
/// assert!(LoginId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoginId(String);

impl LoginId {
    /// Validate and construct a login id.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyLoginId);
        }
        if trimmed.chars().count() > LOGIN_ID_MAX {
            return Err(UserValidationError::LoginIdTooLong { max: LOGIN_ID_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for LoginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LoginId> for String {
    fn from(value: LoginId) -> Self {
        value.0
    }
}

impl TryFrom<String> for LoginId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role stored in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Ordinary member.
    User,
    /// Administrator.
    Admin,
    /// Relationship manager.
    RelationshipManager,
}

impl Role {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::RelationshipManager => "RELATIONSHIP_MANAGER",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "RELATIONSHIP_MANAGER" => Ok(Self::RelationshipManager),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user, without the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i32, example = 1)]
    pub id: UserId,
    #[schema(value_type = String, example = "testuser1")]
    pub login_id: LoginId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub reputation: i32,
    pub points: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public listing entry for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Login id.
    #[schema(value_type = String, example = "testuser1")]
    pub user_id: LoginId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Role breakdown of the user table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total_users: u64,
    pub admin_users: u64,
    pub regular_users: u64,
}

/// Validated contact fields shared by registration and seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    name: String,
    email: String,
    phone: String,
}

impl ContactDetails {
    /// Validate display name, email and phone.
    ///
    /// # Examples
    /// ```
    /// use qna_backend::domain::ContactDetails;
    ///
    /// assert!(ContactDetails::new("Dev", "dev@example.com", "010-4444-4444").is_ok());
    /// assert!(ContactDetails::new("Dev", "not-an-email", "010-4444-4444").is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        let email = email.into().trim().to_owned();
        let phone = phone.into().trim().to_owned();

        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > TEXT_COLUMN_MAX {
            return Err(UserValidationError::TooLong {
                field: "name",
                max: TEXT_COLUMN_MAX,
            });
        }
        if !is_plausible_email(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        if email.chars().count() > TEXT_COLUMN_MAX {
            return Err(UserValidationError::TooLong {
                field: "email",
                max: TEXT_COLUMN_MAX,
            });
        }
        if phone.is_empty() {
            return Err(UserValidationError::EmptyPhone);
        }
        if phone.chars().count() > PHONE_MAX {
            return Err(UserValidationError::TooLong {
                field: "phone",
                max: PHONE_MAX,
            });
        }

        Ok(Self { name, email, phone })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Insert payload for a new user. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub login_id: LoginId,
    pub password_hash: PasswordHash,
    pub contact: ContactDetails,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("USER", Role::User)]
    #[case("ADMIN", Role::Admin)]
    #[case("RELATIONSHIP_MANAGER", Role::RelationshipManager)]
    fn role_round_trips_through_database_text(#[case] raw: &str, #[case] role: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), role);
        assert_eq!(role.as_str(), raw);
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert_eq!(
            "OWNER".parse::<Role>(),
            Err(UserValidationError::UnknownRole("OWNER".to_owned()))
        );
    }

    #[rstest]
    fn login_id_rejects_overlong_values() {
        let raw = "a".repeat(LOGIN_ID_MAX + 1);
        assert_eq!(
            LoginId::new(raw),
            Err(UserValidationError::LoginIdTooLong { max: LOGIN_ID_MAX })
        );
    }

    #[rstest]
    #[case("", "a@b.com", "1", UserValidationError::EmptyName)]
    #[case("n", "ab.com", "1", UserValidationError::InvalidEmail)]
    #[case("n", "@b.com", "1", UserValidationError::InvalidEmail)]
    #[case("n", "a@b.com", " ", UserValidationError::EmptyPhone)]
    #[case(
        "n",
        "a@b.com",
        "0123456789-0123456789",
        UserValidationError::TooLong { field: "phone", max: PHONE_MAX }
    )]
    fn contact_details_validation(
        #[case] name: &str,
        #[case] email: &str,
        #[case] phone: &str,
        #[case] expected: UserValidationError,
    ) {
        assert_eq!(ContactDetails::new(name, email, phone), Err(expected));
    }

    #[rstest]
    fn user_summary_serialises_login_id_as_user_id() {
        let summary = UserSummary {
            user_id: LoginId::new("tester").expect("valid"),
            name: "Tester".to_owned(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let value = serde_json::to_value(summary).expect("serialise");
        assert_eq!(value["userId"], "tester");
    }
}
