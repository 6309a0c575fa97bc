//! Driving port for registration and login use-cases.
//!
//! Inbound adapters call it to authenticate or register without importing
//! persistence or hashing concerns, so handler tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, LoginId, Registration, User, UserId};

/// Domain use-case port for accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Whether `login_id` is free to register.
    async fn login_id_available(&self, login_id: &LoginId) -> Result<bool, Error>;

    /// Create a `USER` account with a hashed password.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Validate credentials and return the authenticated member id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
