//! Port abstraction for question persistence.

use async_trait::async_trait;

use crate::domain::{
    AuthorProfile, Question, QuestionDraft, QuestionId, QuestionListing, QuestionPatch, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by question repository adapters.
    pub enum QuestionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "question repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "question repository query failed: {message}",
        /// The author does not exist.
        AuthorNotFound { user_id: i32 } => "user {user_id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question and credit its author with `reward_points`, atomically.
    async fn insert_rewarded(
        &self,
        author: UserId,
        draft: &QuestionDraft,
        reward_points: i32,
    ) -> Result<Question, QuestionRepositoryError>;

    /// All questions with their authors, newest first.
    async fn list(&self) -> Result<Vec<QuestionListing>, QuestionRepositoryError>;

    async fn find(&self, id: QuestionId) -> Result<Option<Question>, QuestionRepositoryError>;

    /// Increment the view counter and return the question with its author.
    async fn record_view(
        &self,
        id: QuestionId,
    ) -> Result<Option<(Question, AuthorProfile)>, QuestionRepositoryError>;

    async fn update(
        &self,
        id: QuestionId,
        patch: &QuestionPatch,
    ) -> Result<Question, QuestionRepositoryError>;

    /// Delete a question; its answers cascade.
    async fn delete(&self, id: QuestionId) -> Result<(), QuestionRepositoryError>;

    /// Add `delta` to the vote counter.
    async fn adjust_votes(
        &self,
        id: QuestionId,
        delta: i32,
    ) -> Result<Option<Question>, QuestionRepositoryError>;
}
