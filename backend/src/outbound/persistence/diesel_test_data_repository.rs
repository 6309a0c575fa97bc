//! PostgreSQL-backed reference-data adapter.
//!
//! User batches and question batches are each written in a single
//! transaction; a failure part-way leaves nothing behind.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{SeedQuestion, TestDataRepository, TestDataRepositoryError};
use crate::domain::{LoginId, NewUser, Role, User, UserCounts, UserId};

use super::error_mapping::{DieselFailure, classify, map_basic};
use super::models::{NewAnswerRow, NewQuestionRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{answers, questions, users};

/// Diesel-backed implementation of the test data repository.
#[derive(Clone)]
pub struct DieselTestDataRepository {
    pool: DbPool,
}

impl DieselTestDataRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Duplicate(String),
    Overflow(&'static str),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> TestDataRepositoryError {
    TestDataRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> TestDataRepositoryError {
    map_basic(
        classify(error),
        TestDataRepositoryError::connection,
        TestDataRepositoryError::query,
    )
}

fn map_tx_error(error: TxError) -> TestDataRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Duplicate(login_id) => TestDataRepositoryError::duplicate_login_id(login_id),
        TxError::Overflow(what) => TestDataRepositoryError::query(format!("{what} overflow")),
    }
}

fn insert_failure(error: diesel::result::Error, login_id: &LoginId) -> TxError {
    match error {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => TxError::Duplicate(login_id.to_string()),
        other => TxError::Diesel(other),
    }
}

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

#[async_trait]
impl TestDataRepository for DieselTestDataRepository {
    async fn user_count(&self) -> Result<u64, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_count(count))
    }

    async fn question_count(&self) -> Result<u64, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = questions::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_count(count))
    }

    async fn first_users(&self, limit: u32) -> Result<Vec<UserId>, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<i32> = users::table
            .select(users::mbr_id)
            .order(users::mbr_id.asc())
            .limit(i64::from(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(UserId::new).collect())
    }

    async fn insert_users(
        &self,
        batch: Vec<NewUser>,
    ) -> Result<Vec<UserId>, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let mut ids = Vec::with_capacity(batch.len());
                for user in &batch {
                    let id: i32 = diesel::insert_into(users::table)
                        .values(NewUserRow::from(user))
                        .returning(users::mbr_id)
                        .get_result(conn)
                        .await
                        .map_err(|err| insert_failure(err, &user.login_id))?;
                    ids.push(UserId::new(id));
                }
                Ok::<_, TxError>(ids)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from(&user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                DieselFailure::UniqueViolation(_) => {
                    TestDataRepositoryError::duplicate_login_id(user.login_id.as_ref())
                }
                other => map_basic(
                    other,
                    TestDataRepositoryError::connection,
                    TestDataRepositoryError::query,
                ),
            })?;
        User::try_from(row).map_err(|err| TestDataRepositoryError::query(err.to_string()))
    }

    async fn insert_questions(
        &self,
        seeds: Vec<SeedQuestion>,
    ) -> Result<usize, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                for seed in &seeds {
                    let question_id: i32 = diesel::insert_into(questions::table)
                        .values(NewQuestionRow {
                            title: &seed.title,
                            description: &seed.description,
                            tags: &seed.tags,
                            views: seed.views,
                            mbr_id: seed.author.get(),
                        })
                        .returning(questions::id)
                        .get_result(conn)
                        .await?;

                    let rows: Vec<NewAnswerRow<'_>> = seed
                        .answers
                        .iter()
                        .map(|answer| NewAnswerRow {
                            content: &answer.content,
                            votes: answer.votes,
                            accepted: answer.accepted,
                            question_id,
                            mbr_id: answer.author.get(),
                        })
                        .collect();
                    if !rows.is_empty() {
                        diesel::insert_into(answers::table)
                            .values(&rows)
                            .execute(conn)
                            .await?;
                    }

                    let count: i64 = answers::table
                        .filter(answers::question_id.eq(question_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    let count =
                        i32::try_from(count).map_err(|_| TxError::Overflow("answer count"))?;
                    diesel::update(questions::table.find(question_id))
                        .set(questions::answers.eq(count))
                        .execute(conn)
                        .await?;
                    debug!(question_id, answers = count, "seeded question");
                }
                Ok::<_, TxError>(seeds.len())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn clear(&self) -> Result<(), TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(questions::table).execute(conn).await?;
                diesel::delete(users::table).execute(conn).await?;
                Ok::<_, TxError>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn user_counts(&self) -> Result<UserCounts, TestDataRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let admins: i64 = users::table
            .filter(users::role.eq(Role::Admin.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let regular: i64 = users::table
            .filter(users::role.eq(Role::User.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(UserCounts {
            total_users: to_count(total),
            admin_users: to_count(admins),
            regular_users: to_count(regular),
        })
    }

    async fn existing_login_ids(
        &self,
        candidates: Vec<LoginId>,
    ) -> Result<Vec<LoginId>, TestDataRepositoryError> {
        let raw: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found: Vec<String> = users::table
            .filter(users::user_id.eq_any(&raw))
            .select(users::user_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(candidates
            .into_iter()
            .filter(|candidate| found.iter().any(|id| id == candidate.as_ref()))
            .collect())
    }
}
