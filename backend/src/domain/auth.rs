//! Authentication primitives: login credentials, registration payloads and
//! stored password hashes.
//!
//! Plain-text passwords only ever live inside [`Zeroizing`] buffers and are
//! turned into a [`PasswordHash`] by the `PasswordHasher` port before
//! anything is persisted.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{ContactDetails, LoginId, UserValidationError};

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Login id was missing, blank, or too long.
    #[error(transparent)]
    LoginId(UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Contact fields failed validation.
    #[error(transparent)]
    Contact(UserValidationError),
}

impl LoginValidationError {
    /// Name of the offending request field, for error details.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::LoginId(_) => "userId",
            Self::EmptyPassword => "password",
            Self::Contact(UserValidationError::EmptyName | UserValidationError::TooLong { field: "name", .. }) => "name",
            Self::Contact(UserValidationError::InvalidEmail | UserValidationError::TooLong { field: "email", .. }) => "email",
            Self::Contact(_) => "phone",
        }
    }
}

fn checked_password(password: &str) -> Result<Zeroizing<String>, LoginValidationError> {
    if password.is_empty() {
        return Err(LoginValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials.
///
/// ## Invariants
/// - the login id is trimmed and non-empty;
/// - the password is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use qna_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "admin123!").expect("valid");
/// assert_eq!(creds.login_id().as_ref(), "admin");
/// assert_eq!(creds.password(), "admin123!");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    login_id: LoginId,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(login_id: &str, password: &str) -> Result<Self, LoginValidationError> {
        let login_id = LoginId::new(login_id).map_err(LoginValidationError::LoginId)?;
        let password = checked_password(password)?;
        Ok(Self { login_id, password })
    }

    pub fn login_id(&self) -> &LoginId {
        &self.login_id
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated self-service registration.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    login_id: LoginId,
    password: Zeroizing<String>,
    contact: ContactDetails,
}

impl Registration {
    /// Validate every registration field.
    ///
    /// # Examples
    /// ```
    /// use qna_backend::domain::Registration;
    ///
    /// let ok = Registration::try_from_parts("newbie", "pw", "New", "new@example.com", "010-1");
    /// assert!(ok.is_ok());
    /// let bad = Registration::try_from_parts("newbie", "", "New", "new@example.com", "010-1");
    /// assert!(bad.is_err());
    /// ```
    pub fn try_from_parts(
        login_id: &str,
        password: &str,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Self, LoginValidationError> {
        let login_id = LoginId::new(login_id).map_err(LoginValidationError::LoginId)?;
        let password = checked_password(password)?;
        let contact =
            ContactDetails::new(name, email, phone).map_err(LoginValidationError::Contact)?;
        Ok(Self {
            login_id,
            password,
            contact,
        })
    }

    pub fn login_id(&self) -> &LoginId {
        &self.login_id
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .field("contact", &self.contact)
            .finish()
    }
}

/// Encoded password hash (PHC string format).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a `PasswordHasher`.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
