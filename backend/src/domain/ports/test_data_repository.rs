//! Port abstraction for reference-data seeding.
//!
//! Adapters must write a batch of users in one transaction, and a batch of
//! questions together with their answers in another, recomputing each
//! question's cached answer count before commit.

use async_trait::async_trait;

use crate::domain::{LoginId, NewUser, User, UserCounts, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by test data repository adapters.
    pub enum TestDataRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "test data connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "test data query failed: {message}",
        /// A user with the same login id already exists.
        DuplicateLoginId { login_id: String } => "login id {login_id} is already taken",
    }
}

/// Answer written alongside a seeded question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAnswer {
    pub content: String,
    pub votes: i32,
    pub accepted: bool,
    pub author: UserId,
}

/// Question written by the seeder, with its answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedQuestion {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub views: i32,
    pub author: UserId,
    pub answers: Vec<SeedAnswer>,
}

/// Port for the reads and writes performed by the seeder and validator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestDataRepository: Send + Sync {
    async fn user_count(&self) -> Result<u64, TestDataRepositoryError>;

    async fn question_count(&self) -> Result<u64, TestDataRepositoryError>;

    /// Lowest `limit` member ids.
    async fn first_users(&self, limit: u32) -> Result<Vec<UserId>, TestDataRepositoryError>;

    /// Insert users atomically; ids are returned in input order.
    async fn insert_users(&self, users: Vec<NewUser>)
    -> Result<Vec<UserId>, TestDataRepositoryError>;

    /// Insert one user and return the stored row.
    async fn insert_user(&self, user: NewUser) -> Result<User, TestDataRepositoryError>;

    /// Insert questions and their answers atomically; returns the question count written.
    async fn insert_questions(
        &self,
        questions: Vec<SeedQuestion>,
    ) -> Result<usize, TestDataRepositoryError>;

    /// Delete every question, then every user.
    async fn clear(&self) -> Result<(), TestDataRepositoryError>;

    async fn user_counts(&self) -> Result<UserCounts, TestDataRepositoryError>;

    /// Subset of `candidates` that exist as login ids.
    async fn existing_login_ids(
        &self,
        candidates: Vec<LoginId>,
    ) -> Result<Vec<LoginId>, TestDataRepositoryError>;
}
