//! Driving port for question use-cases.

use async_trait::async_trait;

use crate::domain::{
    Error, Question, QuestionDetail, QuestionDraft, QuestionId, QuestionListing, QuestionPatch,
    UserId, VoteDirection,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionBoard: Send + Sync {
    /// Post a question; the author earns points for it.
    async fn create(&self, author: UserId, draft: QuestionDraft) -> Result<Question, Error>;

    async fn list(&self) -> Result<Vec<QuestionListing>, Error>;

    /// Question page. Counts as a view.
    async fn get(&self, id: QuestionId) -> Result<QuestionDetail, Error>;

    /// Owner-only edit.
    async fn update(
        &self,
        id: QuestionId,
        actor: UserId,
        patch: QuestionPatch,
    ) -> Result<Question, Error>;

    /// Owner-only delete.
    async fn delete(&self, id: QuestionId, actor: UserId) -> Result<(), Error>;

    async fn vote(&self, id: QuestionId, direction: VoteDirection) -> Result<Question, Error>;
}
