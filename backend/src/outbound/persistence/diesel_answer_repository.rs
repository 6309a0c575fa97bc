//! PostgreSQL-backed answer storage.
//!
//! The cached `questions.answers` counter is updated in the same transaction
//! as every insert and delete.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{AnswerRepository, AnswerRepositoryError};
use crate::domain::{Answer, AnswerContent, AnswerId, AnswerView, QuestionId, UserId};

use super::error_mapping::{classify, map_basic};
use super::models::{AnswerRow, AuthorColumns, NewAnswerRow, author_profile};
use super::pool::{DbPool, PoolError};
use super::schema::{answers, questions, users};

/// Diesel-backed implementation of the answer repository port.
#[derive(Clone)]
pub struct DieselAnswerRepository {
    pool: DbPool,
}

impl DieselAnswerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    QuestionNotFound(i32),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> AnswerRepositoryError {
    AnswerRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> AnswerRepositoryError {
    map_basic(
        classify(error),
        AnswerRepositoryError::connection,
        AnswerRepositoryError::query,
    )
}

fn map_tx_error(error: TxError) -> AnswerRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::QuestionNotFound(id) => AnswerRepositoryError::question_not_found(id),
    }
}

#[async_trait]
impl AnswerRepository for DieselAnswerRepository {
    async fn insert(
        &self,
        question: QuestionId,
        author: UserId,
        content: &AnswerContent,
    ) -> Result<Answer, AnswerRepositoryError> {
        let question_id = question.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    let bumped = diesel::update(questions::table.find(question_id))
                        .set(questions::answers.eq(questions::answers + 1))
                        .execute(conn)
                        .await?;
                    if bumped == 0 {
                        return Err(TxError::QuestionNotFound(question_id));
                    }

                    let row: AnswerRow = diesel::insert_into(answers::table)
                        .values(NewAnswerRow {
                            content: content.as_str(),
                            votes: 0,
                            accepted: false,
                            question_id,
                            mbr_id: author.get(),
                        })
                        .returning(AnswerRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, TxError>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;
        Ok(row.into())
    }

    async fn list_for_question(
        &self,
        question: QuestionId,
    ) -> Result<Vec<AnswerView>, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(AnswerRow, AuthorColumns)> = answers::table
            .left_join(users::table)
            .filter(answers::question_id.eq(question.get()))
            .select((
                AnswerRow::as_select(),
                (users::name, users::image, users::reputation).nullable(),
            ))
            .order((answers::votes.desc(), answers::created_at.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(row, author)| AnswerView {
                answer: row.into(),
                author: author_profile(author),
            })
            .collect())
    }

    async fn find(&self, id: AnswerId) -> Result<Option<Answer>, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AnswerRow> = answers::table
            .find(id.get())
            .select(AnswerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Answer::from))
    }

    async fn update_content(
        &self,
        id: AnswerId,
        content: &AnswerContent,
    ) -> Result<Answer, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: AnswerRow = diesel::update(answers::table.find(id.get()))
            .set((
                answers::content.eq(content.as_str()),
                answers::updated_at.eq(Utc::now()),
            ))
            .returning(AnswerRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn delete(&self, answer: &Answer) -> Result<(), AnswerRepositoryError> {
        let answer_id = answer.id.get();
        let question_id = answer.question_id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let removed = diesel::delete(answers::table.find(answer_id))
                    .execute(conn)
                    .await?;
                if removed > 0 {
                    diesel::update(
                        questions::table
                            .find(question_id)
                            .filter(questions::answers.gt(0)),
                    )
                    .set(questions::answers.eq(questions::answers - 1))
                    .execute(conn)
                    .await?;
                }
                Ok::<_, TxError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn adjust_votes(
        &self,
        id: AnswerId,
        delta: i32,
    ) -> Result<Option<Answer>, AnswerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AnswerRow> = diesel::update(answers::table.find(id.get()))
            .set(answers::votes.eq(answers::votes + delta))
            .returning(AnswerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Answer::from))
    }

    async fn accept(&self, answer: &Answer) -> Result<Answer, AnswerRepositoryError> {
        let answer_id = answer.id.get();
        let question_id = answer.question_id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    diesel::update(
                        answers::table
                            .filter(answers::question_id.eq(question_id))
                            .filter(answers::id.ne(answer_id))
                            .filter(answers::accepted.eq(true)),
                    )
                    .set(answers::accepted.eq(false))
                    .execute(conn)
                    .await?;

                    let row: AnswerRow = diesel::update(answers::table.find(answer_id))
                        .set(answers::accepted.eq(true))
                        .returning(AnswerRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, TxError>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;
        Ok(row.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn missing_question_maps_to_port_variant() {
        assert_eq!(
            map_tx_error(TxError::QuestionNotFound(4)),
            AnswerRepositoryError::question_not_found(4)
        );
    }

    #[rstest]
    fn missing_rows_are_query_errors() {
        assert!(matches!(
            map_diesel_error(diesel::result::Error::NotFound),
            AnswerRepositoryError::Query { .. }
        ));
    }
}
