//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{LoginId, NewUser, PasswordHash, User, UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A user with the same login id already exists.
        DuplicateLoginId { login_id: String } => "login id {login_id} is already taken",
    }
}

/// Stored credential hash for a login id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored row.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by member id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Whether any user already uses `login_id`.
    async fn login_id_exists(&self, login_id: &LoginId) -> Result<bool, UserPersistenceError>;

    /// Credential hash for `login_id`, if such a user exists.
    async fn find_credentials(
        &self,
        login_id: &LoginId,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// All users, newest first.
    async fn list_summaries(&self) -> Result<Vec<UserSummary>, UserPersistenceError>;

    /// Users whose login id or name contains `term` (case-insensitive), newest first.
    async fn search_summaries(&self, term: &str)
    -> Result<Vec<UserSummary>, UserPersistenceError>;
}
