//! Answer use-cases, including acceptance by the question's author.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AnswerBoard, AnswerRepository, AnswerRepositoryError, QuestionRepository,
};
use crate::domain::question_service::map_question_error;
use crate::domain::{
    Answer, AnswerContent, AnswerId, AnswerView, Error, QuestionId, UserId, VoteDirection,
};

const ANSWER_NOT_FOUND: &str = "Answer not found";
const QUESTION_NOT_FOUND: &str = "Question not found";

pub(crate) fn map_answer_error(error: AnswerRepositoryError) -> Error {
    match error {
        AnswerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("answer repository unavailable: {message}"))
        }
        AnswerRepositoryError::Query { message } => {
            Error::internal(format!("answer repository error: {message}"))
        }
        AnswerRepositoryError::QuestionNotFound { .. } => Error::not_found(QUESTION_NOT_FOUND),
    }
}

/// Answer service implementing [`AnswerBoard`].
#[derive(Clone)]
pub struct AnswerService<A, Q> {
    answers: Arc<A>,
    questions: Arc<Q>,
}

impl<A, Q> AnswerService<A, Q> {
    pub fn new(answers: Arc<A>, questions: Arc<Q>) -> Self {
        Self { answers, questions }
    }
}

impl<A, Q> AnswerService<A, Q>
where
    A: AnswerRepository,
    Q: QuestionRepository,
{
    async fn require_question(&self, question: QuestionId) -> Result<(), Error> {
        self.questions
            .find(question)
            .await
            .map_err(map_question_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))
    }

    /// Answer `id`, provided it belongs to `question`.
    async fn load(&self, question: QuestionId, id: AnswerId) -> Result<Answer, Error> {
        self.answers
            .find(id)
            .await
            .map_err(map_answer_error)?
            .filter(|answer| answer.question_id == question)
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))
    }

    async fn owned(
        &self,
        question: QuestionId,
        id: AnswerId,
        actor: UserId,
        verb: &str,
    ) -> Result<Answer, Error> {
        let answer = self.load(question, id).await?;
        if answer.author_id != actor {
            return Err(Error::forbidden(format!(
                "You can only {verb} your own answers"
            )));
        }
        Ok(answer)
    }
}

#[async_trait]
impl<A, Q> AnswerBoard for AnswerService<A, Q>
where
    A: AnswerRepository,
    Q: QuestionRepository,
{
    async fn create(
        &self,
        question: QuestionId,
        author: UserId,
        content: AnswerContent,
    ) -> Result<Answer, Error> {
        self.require_question(question).await?;
        let answer = self
            .answers
            .insert(question, author, &content)
            .await
            .map_err(map_answer_error)?;
        info!(answer_id = %answer.id, question_id = %question, "answer posted");
        Ok(answer)
    }

    async fn list(&self, question: QuestionId) -> Result<Vec<AnswerView>, Error> {
        self.require_question(question).await?;
        self.answers
            .list_for_question(question)
            .await
            .map_err(map_answer_error)
    }

    async fn get(&self, question: QuestionId, id: AnswerId) -> Result<Answer, Error> {
        self.load(question, id).await
    }

    async fn update(
        &self,
        question: QuestionId,
        id: AnswerId,
        actor: UserId,
        content: AnswerContent,
    ) -> Result<Answer, Error> {
        self.owned(question, id, actor, "update").await?;
        self.answers
            .update_content(id, &content)
            .await
            .map_err(map_answer_error)
    }

    async fn delete(
        &self,
        question: QuestionId,
        id: AnswerId,
        actor: UserId,
    ) -> Result<(), Error> {
        let answer = self.owned(question, id, actor, "delete").await?;
        self.answers.delete(&answer).await.map_err(map_answer_error)
    }

    async fn vote(
        &self,
        question: QuestionId,
        id: AnswerId,
        direction: VoteDirection,
    ) -> Result<Answer, Error> {
        self.load(question, id).await?;
        self.answers
            .adjust_votes(id, direction.delta())
            .await
            .map_err(map_answer_error)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))
    }

    async fn accept(
        &self,
        question: QuestionId,
        id: AnswerId,
        actor: UserId,
    ) -> Result<Answer, Error> {
        let answer = self.load(question, id).await?;
        let parent = self
            .questions
            .find(question)
            .await
            .map_err(map_question_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        if parent.author_id != actor {
            return Err(Error::forbidden(
                "Only the question author can accept an answer",
            ));
        }
        let accepted = self.answers.accept(&answer).await.map_err(map_answer_error)?;
        info!(answer_id = %accepted.id, question_id = %question, "answer accepted");
        Ok(accepted)
    }
}
