//! PostgreSQL-backed question storage.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{QuestionRepository, QuestionRepositoryError};
use crate::domain::{
    AuthorProfile, Question, QuestionDraft, QuestionId, QuestionListing, QuestionPatch, UserId,
};

use super::error_mapping::{classify, map_basic};
use super::models::{
    AuthorColumns, NewQuestionRow, QuestionChangeset, QuestionRow, author_profile, author_summary,
};
use super::pool::{DbPool, PoolError};
use super::schema::{questions, users};

/// Diesel-backed implementation of the question repository port.
#[derive(Clone)]
pub struct DieselQuestionRepository {
    pool: DbPool,
}

impl DieselQuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    AuthorNotFound(i32),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> QuestionRepositoryError {
    QuestionRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> QuestionRepositoryError {
    map_basic(
        classify(error),
        QuestionRepositoryError::connection,
        QuestionRepositoryError::query,
    )
}

fn map_tx_error(error: TxError) -> QuestionRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::AuthorNotFound(user_id) => QuestionRepositoryError::author_not_found(user_id),
    }
}

#[async_trait]
impl QuestionRepository for DieselQuestionRepository {
    async fn insert_rewarded(
        &self,
        author: UserId,
        draft: &QuestionDraft,
        reward_points: i32,
    ) -> Result<Question, QuestionRepositoryError> {
        let author_id = author.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    // Lock the author row so the point update cannot race a delete.
                    let found: Option<i32> = users::table
                        .find(author_id)
                        .select(users::mbr_id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if found.is_none() {
                        return Err(TxError::AuthorNotFound(author_id));
                    }

                    let row: QuestionRow = diesel::insert_into(questions::table)
                        .values(NewQuestionRow {
                            title: draft.title(),
                            description: draft.description(),
                            tags: draft.tags(),
                            views: 0,
                            mbr_id: author_id,
                        })
                        .returning(QuestionRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::update(users::table.find(author_id))
                        .set(users::point.eq(users::point + reward_points))
                        .execute(conn)
                        .await?;
                    Ok::<_, TxError>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<QuestionListing>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(QuestionRow, Option<(String, String)>)> = questions::table
            .left_join(users::table)
            .select((
                QuestionRow::as_select(),
                (users::name, users::user_id).nullable(),
            ))
            .order(questions::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(row, author)| {
                let author = author_summary(author)
                    .map_err(|err| QuestionRepositoryError::query(err.to_string()))?;
                Ok(QuestionListing {
                    question: row.into(),
                    author,
                })
            })
            .collect()
    }

    async fn find(&self, id: QuestionId) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<QuestionRow> = questions::table
            .find(id.get())
            .select(QuestionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Question::from))
    }

    async fn record_view(
        &self,
        id: QuestionId,
    ) -> Result<Option<(Question, AuthorProfile)>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<QuestionRow> = diesel::update(questions::table.find(id.get()))
            .set(questions::views.eq(questions::views + 1))
            .returning(QuestionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let author: AuthorColumns = users::table
            .find(row.mbr_id)
            .select((users::name, users::image, users::reputation))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(Some((row.into(), author_profile(author))))
    }

    async fn update(
        &self,
        id: QuestionId,
        patch: &QuestionPatch,
    ) -> Result<Question, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: QuestionRow = diesel::update(questions::table.find(id.get()))
            .set(QuestionChangeset {
                title: patch.title.as_deref(),
                description: patch.description.as_deref(),
                tags: patch.tags.as_deref(),
                updated_at: Utc::now(),
            })
            .returning(QuestionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn delete(&self, id: QuestionId) -> Result<(), QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(questions::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn adjust_votes(
        &self,
        id: QuestionId,
        delta: i32,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<QuestionRow> = diesel::update(questions::table.find(id.get()))
            .set(questions::votes.eq(questions::votes + delta))
            .returning(QuestionRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Question::from))
    }
}
