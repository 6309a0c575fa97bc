//! Driving port for reference-data seeding and user validation.

use async_trait::async_trait;

use crate::domain::test_data::{SeedOutcome, TestUserRequest, UserValidationReport};
use crate::domain::{Error, User, UserCounts};

/// Domain use-case port for seeding, clearing and validating test data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestDataCommand: Send + Sync {
    /// Create the reference users, questions and answers when absent.
    async fn seed(&self) -> Result<SeedOutcome, Error>;

    /// Delete all questions, then all users.
    async fn clear(&self) -> Result<(), Error>;

    /// Create a single user, filling defaults for missing fields.
    async fn create_user(&self, request: TestUserRequest) -> Result<User, Error>;

    /// Role breakdown of the user table.
    async fn stats(&self) -> Result<UserCounts, Error>;

    /// Check that the reference users are present. Query failures are
    /// reported inside the result rather than returned.
    async fn validate_users(&self) -> UserValidationReport;
}
