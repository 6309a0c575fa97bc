//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Password hashes are only ever read through `find_credentials`; every other
//! query selects [`UserRow`], which omits the column.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{LoginId, NewUser, PasswordHash, User, UserId, UserSummary};

use super::error_mapping::{DieselFailure, classify, map_basic};
use super::models::{CorruptRow, NewUserRow, UserRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use qna_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/qna")).await?;
    /// let repository = DieselUserRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic(
        classify(error),
        UserPersistenceError::connection,
        UserPersistenceError::query,
    )
}

fn map_corrupt_row(error: CorruptRow) -> UserPersistenceError {
    UserPersistenceError::query(error.to_string())
}

/// `%term%` with LIKE wildcards in `term` escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn into_summaries(rows: Vec<UserSummaryRow>) -> Result<Vec<UserSummary>, UserPersistenceError> {
    rows.into_iter()
        .map(|row| UserSummary::try_from(row).map_err(map_corrupt_row))
        .collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match classify(err) {
                DieselFailure::UniqueViolation(_) => {
                    UserPersistenceError::duplicate_login_id(user.login_id.as_ref())
                }
                other => map_basic(
                    other,
                    UserPersistenceError::connection,
                    UserPersistenceError::query,
                ),
            })?;
        User::try_from(row).map_err(map_corrupt_row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from)
            .transpose()
            .map_err(map_corrupt_row)
    }

    async fn login_id_exists(&self, login_id: &LoginId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::user_id.eq(login_id.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn find_credentials(
        &self,
        login_id: &LoginId,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(i32, String)> = users::table
            .filter(users::user_id.eq(login_id.as_ref()))
            .select((users::mbr_id, users::password))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|(mbr_id, password)| StoredCredentials {
            user_id: UserId::new(mbr_id),
            password_hash: PasswordHash::new(password),
        }))
    }

    async fn list_summaries(&self) -> Result<Vec<UserSummary>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserSummaryRow> = users::table
            .select(UserSummaryRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_summaries(rows)
    }

    async fn search_summaries(
        &self,
        term: &str,
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        let pattern = contains_pattern(term);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserSummaryRow> = users::table
            .filter(
                users::user_id
                    .ilike(&pattern)
                    .or(users::name.ilike(&pattern)),
            )
            .select(UserSummaryRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_summaries(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("kim", "%kim%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("c:\\", "%c:\\\\%")]
    fn search_terms_are_escaped(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(term), expected);
    }

    #[rstest]
    fn corrupt_rows_surface_as_query_errors() {
        let row = UserSummaryRow {
            user_id: String::new(),
            name: "Nobody".to_owned(),
            created_at: chrono::Utc::now(),
        };
        let error = into_summaries(vec![row]).expect_err("empty login id is rejected");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }
}
