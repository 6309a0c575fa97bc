//! Question use-cases: posting, browsing, editing and voting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::answer_service::map_answer_error;
use crate::domain::ports::{
    AnswerRepository, QuestionBoard, QuestionRepository, QuestionRepositoryError,
};
use crate::domain::{
    Error, Question, QuestionDetail, QuestionDraft, QuestionId, QuestionListing, QuestionPatch,
    UserId, VoteDirection,
};

/// Points credited to the author of a new question.
pub const QUESTION_REWARD_POINTS: i32 = 10;

const QUESTION_NOT_FOUND: &str = "Question not found";

pub(crate) fn map_question_error(error: QuestionRepositoryError) -> Error {
    match error {
        QuestionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("question repository unavailable: {message}"))
        }
        QuestionRepositoryError::Query { message } => {
            Error::internal(format!("question repository error: {message}"))
        }
        QuestionRepositoryError::AuthorNotFound { .. } => Error::not_found("User not found"),
    }
}

/// Question service implementing [`QuestionBoard`].
#[derive(Clone)]
pub struct QuestionService<Q, A> {
    questions: Arc<Q>,
    answers: Arc<A>,
}

impl<Q, A> QuestionService<Q, A> {
    pub fn new(questions: Arc<Q>, answers: Arc<A>) -> Self {
        Self { questions, answers }
    }
}

impl<Q, A> QuestionService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn owned_question(&self, id: QuestionId, actor: UserId, verb: &str) -> Result<Question, Error> {
        let question = self
            .questions
            .find(id)
            .await
            .map_err(map_question_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        if question.author_id != actor {
            return Err(Error::forbidden(format!(
                "You can only {verb} your own questions"
            )));
        }
        Ok(question)
    }
}

#[async_trait]
impl<Q, A> QuestionBoard for QuestionService<Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn create(&self, author: UserId, draft: QuestionDraft) -> Result<Question, Error> {
        let question = self
            .questions
            .insert_rewarded(author, &draft, QUESTION_REWARD_POINTS)
            .await
            .map_err(map_question_error)?;
        info!(question_id = %question.id, author = %author, "question posted");
        Ok(question)
    }

    async fn list(&self) -> Result<Vec<QuestionListing>, Error> {
        self.questions.list().await.map_err(map_question_error)
    }

    async fn get(&self, id: QuestionId) -> Result<QuestionDetail, Error> {
        let (question, author) = self
            .questions
            .record_view(id)
            .await
            .map_err(map_question_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        let answers = self
            .answers
            .list_for_question(id)
            .await
            .map_err(map_answer_error)?;
        Ok(QuestionDetail {
            question,
            author,
            answers,
        })
    }

    async fn update(
        &self,
        id: QuestionId,
        actor: UserId,
        patch: QuestionPatch,
    ) -> Result<Question, Error> {
        self.owned_question(id, actor, "update").await?;
        self.questions
            .update(id, &patch)
            .await
            .map_err(map_question_error)
    }

    async fn delete(&self, id: QuestionId, actor: UserId) -> Result<(), Error> {
        self.owned_question(id, actor, "delete").await?;
        self.questions.delete(id).await.map_err(map_question_error)?;
        info!(question_id = %id, "question deleted");
        Ok(())
    }

    async fn vote(&self, id: QuestionId, direction: VoteDirection) -> Result<Question, Error> {
        self.questions
            .adjust_votes(id, direction.delta())
            .await
            .map_err(map_question_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAnswerRepository, MockQuestionRepository};
    use crate::domain::{AuthorProfile, ErrorCode};
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn question(id: i32, author: i32) -> Question {
        Question {
            id: QuestionId::new(id),
            title: "How do transactions work?".to_owned(),
            description: "Looking for an explanation of isolation.".to_owned(),
            votes: 0,
            answers: 0,
            views: 1,
            tags: vec!["sql".to_owned()],
            author_id: UserId::new(author),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn service(
        questions: MockQuestionRepository,
        answers: MockAnswerRepository,
    ) -> QuestionService<MockQuestionRepository, MockAnswerRepository> {
        QuestionService::new(Arc::new(questions), Arc::new(answers))
    }

    #[rstest]
    #[tokio::test]
    async fn create_rewards_the_author() {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_insert_rewarded()
            .withf(|author, _, points| *author == UserId::new(3) && *points == 10)
            .times(1)
            .return_once(|_, _, _| Ok(question(1, 3)));
        let draft = QuestionDraft::new(
            "How do transactions work?",
            "Looking for an explanation of isolation.",
            Vec::new(),
        )
        .expect("valid draft");

        let created = service(questions, MockAnswerRepository::new())
            .create(UserId::new(3), draft)
            .await
            .expect("created");
        assert_eq!(created.id, QuestionId::new(1));
    }

    #[rstest]
    #[tokio::test]
    async fn create_for_missing_author_is_not_found() {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_insert_rewarded()
            .return_once(|_, _, _| Err(QuestionRepositoryError::author_not_found(99)));
        let draft = QuestionDraft::new("A valid title", "a description long enough", Vec::new())
            .expect("valid draft");

        let err = service(questions, MockAnswerRepository::new())
            .create(UserId::new(99), draft)
            .await
            .expect_err("missing author");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn get_records_a_view_and_loads_answers() {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_record_view()
            .with(eq(QuestionId::new(5)))
            .times(1)
            .return_once(|_| {
                Ok(Some((
                    question(5, 1),
                    AuthorProfile::from_parts(Some("Ada".to_owned()), None, Some(12)),
                )))
            });
        let mut answers = MockAnswerRepository::new();
        answers
            .expect_list_for_question()
            .return_once(|_| Ok(Vec::new()));

        let detail = service(questions, answers)
            .get(QuestionId::new(5))
            .await
            .expect("detail");
        assert_eq!(detail.author.name, "Ada");
        assert_eq!(detail.author.image, "/placeholder-user.jpg");
        assert!(detail.answers.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn get_missing_question_is_not_found() {
        let mut questions = MockQuestionRepository::new();
        questions.expect_record_view().return_once(|_| Ok(None));

        let err = service(questions, MockAnswerRepository::new())
            .get(QuestionId::new(404))
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(1, true)]
    #[case(2, false)]
    #[tokio::test]
    async fn only_the_owner_may_delete(#[case] actor: i32, #[case] allowed: bool) {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find()
            .return_once(|_| Ok(Some(question(8, 1))));
        questions
            .expect_delete()
            .times(usize::from(allowed))
            .returning(|_| Ok(()));

        let result = service(questions, MockAnswerRepository::new())
            .delete(QuestionId::new(8), UserId::new(actor))
            .await;
        match result {
            Ok(()) => assert!(allowed),
            Err(err) => {
                assert!(!allowed);
                assert_eq!(err.code(), ErrorCode::Forbidden);
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn update_by_stranger_is_forbidden() {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_find()
            .return_once(|_| Ok(Some(question(8, 1))));
        questions.expect_update().never();
        let patch = QuestionPatch::new(Some("A brand new title"), None, None).expect("patch");

        let err = service(questions, MockAnswerRepository::new())
            .update(QuestionId::new(8), UserId::new(2), patch)
            .await
            .expect_err("forbidden");
        assert_eq!(err.message(), "You can only update your own questions");
    }

    #[rstest]
    #[case(VoteDirection::Up, 1)]
    #[case(VoteDirection::Down, -1)]
    #[tokio::test]
    async fn vote_applies_delta(#[case] direction: VoteDirection, #[case] delta: i32) {
        let mut questions = MockQuestionRepository::new();
        questions
            .expect_adjust_votes()
            .with(eq(QuestionId::new(4)), eq(delta))
            .return_once(move |_, delta| {
                let mut voted = question(4, 1);
                voted.votes = delta;
                Ok(Some(voted))
            });

        let voted = service(questions, MockAnswerRepository::new())
            .vote(QuestionId::new(4), direction)
            .await
            .expect("voted");
        assert_eq!(voted.votes, delta);
    }
}
