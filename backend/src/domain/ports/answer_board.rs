//! Driving port for answer use-cases.
//!
//! Answers are addressed through their question; an answer id that belongs
//! to another question is reported as not found.

use async_trait::async_trait;

use crate::domain::{
    Answer, AnswerContent, AnswerId, AnswerView, Error, QuestionId, UserId, VoteDirection,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerBoard: Send + Sync {
    async fn create(
        &self,
        question: QuestionId,
        author: UserId,
        content: AnswerContent,
    ) -> Result<Answer, Error>;

    async fn list(&self, question: QuestionId) -> Result<Vec<AnswerView>, Error>;

    async fn get(&self, question: QuestionId, id: AnswerId) -> Result<Answer, Error>;

    /// Owner-only edit.
    async fn update(
        &self,
        question: QuestionId,
        id: AnswerId,
        actor: UserId,
        content: AnswerContent,
    ) -> Result<Answer, Error>;

    /// Owner-only delete.
    async fn delete(&self, question: QuestionId, id: AnswerId, actor: UserId)
    -> Result<(), Error>;

    async fn vote(
        &self,
        question: QuestionId,
        id: AnswerId,
        direction: VoteDirection,
    ) -> Result<Answer, Error>;

    /// Accept an answer. Only the question's author may do this.
    async fn accept(
        &self,
        question: QuestionId,
        id: AnswerId,
        actor: UserId,
    ) -> Result<Answer, Error>;
}
