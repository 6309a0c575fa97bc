//! Port abstraction for answer persistence.
//!
//! Adapters keep `questions.answers` in step with inserts and deletes, and
//! guarantee at most one accepted answer per question.

use async_trait::async_trait;

use crate::domain::{Answer, AnswerContent, AnswerId, AnswerView, QuestionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by answer repository adapters.
    pub enum AnswerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "answer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "answer repository query failed: {message}",
        /// The parent question does not exist.
        QuestionNotFound { question_id: i32 } => "question {question_id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Insert an answer and increment the question's answer count, atomically.
    async fn insert(
        &self,
        question: QuestionId,
        author: UserId,
        content: &AnswerContent,
    ) -> Result<Answer, AnswerRepositoryError>;

    /// Answers of a question with author profiles, votes desc then oldest first.
    async fn list_for_question(
        &self,
        question: QuestionId,
    ) -> Result<Vec<AnswerView>, AnswerRepositoryError>;

    async fn find(&self, id: AnswerId) -> Result<Option<Answer>, AnswerRepositoryError>;

    async fn update_content(
        &self,
        id: AnswerId,
        content: &AnswerContent,
    ) -> Result<Answer, AnswerRepositoryError>;

    /// Delete an answer and decrement its question's count, atomically.
    async fn delete(&self, answer: &Answer) -> Result<(), AnswerRepositoryError>;

    async fn adjust_votes(
        &self,
        id: AnswerId,
        delta: i32,
    ) -> Result<Option<Answer>, AnswerRepositoryError>;

    /// Clear acceptance on sibling answers, then accept this one, atomically.
    async fn accept(&self, answer: &Answer) -> Result<Answer, AnswerRepositoryError>;
}
