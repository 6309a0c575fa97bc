//! PostgreSQL-backed migration log and statement runner.
//!
//! Every apply or revert runs in one transaction that first takes a
//! transaction-scoped advisory lock, so concurrent runners serialise on the
//! log instead of racing on DDL.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{debug, info};

use crate::domain::migrations::{MigrationDefinition, MigrationRecord};
use crate::domain::ports::{ApplyOutcome, MigrationStore, MigrationStoreError, RevertOutcome};

use super::error_mapping::{classify, map_basic};
use super::models::MigrationRow;
use super::pool::{DbPool, PoolError};
use super::schema::migrations_history;

/// Advisory lock key shared by every migration runner ("qnamigr" in ASCII).
const MIGRATION_LOCK_KEY: i64 = 0x716e_616d_6967_72;

const CREATE_LOG_TABLE: &str = "CREATE TABLE IF NOT EXISTS migrations_history (
    name VARCHAR(255) PRIMARY KEY,
    timestamp BIGINT NOT NULL
)";

/// Diesel implementation of [`MigrationStore`].
#[derive(Clone)]
pub struct DieselMigrationStore {
    pool: DbPool,
}

impl DieselMigrationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a migration transaction.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Statement { migration: String, message: String },
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> MigrationStoreError {
    MigrationStoreError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> MigrationStoreError {
    map_basic(
        classify(error),
        MigrationStoreError::connection,
        MigrationStoreError::query,
    )
}

fn map_tx_error(error: TxError) -> MigrationStoreError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Statement { migration, message } => {
            MigrationStoreError::statement(migration, message)
        }
    }
}

async fn lock_log(conn: &mut diesel_async::AsyncPgConnection) -> Result<(), TxError> {
    diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
        .bind::<BigInt, _>(MIGRATION_LOCK_KEY)
        .execute(conn)
        .await?;
    Ok(())
}

async fn run_statements(
    conn: &mut diesel_async::AsyncPgConnection,
    migration: &str,
    statements: &[&str],
) -> Result<(), TxError> {
    for (index, statement) in statements.iter().enumerate() {
        debug!(migration, index, "executing migration statement");
        diesel::sql_query(*statement)
            .execute(conn)
            .await
            .map_err(|err| TxError::Statement {
                migration: migration.to_owned(),
                message: err.to_string(),
            })?;
    }
    Ok(())
}

#[async_trait]
impl MigrationStore for DieselMigrationStore {
    async fn ensure_log(&self) -> Result<(), MigrationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::sql_query(CREATE_LOG_TABLE)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn executed(&self) -> Result<Vec<MigrationRecord>, MigrationStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MigrationRow> = migrations_history::table
            .select(MigrationRow::as_select())
            .order((migrations_history::timestamp.asc(), migrations_history::name.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(MigrationRecord::from).collect())
    }

    async fn apply(
        &self,
        migration: &MigrationDefinition,
    ) -> Result<ApplyOutcome, MigrationStoreError> {
        let migration = *migration;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    lock_log(conn).await?;

                    let recorded: i64 = migrations_history::table
                        .filter(migrations_history::name.eq(migration.name))
                        .count()
                        .get_result(conn)
                        .await?;
                    if recorded > 0 {
                        return Ok(ApplyOutcome::AlreadyApplied);
                    }

                    run_statements(conn, migration.name, migration.up).await?;

                    diesel::insert_into(migrations_history::table)
                        .values(MigrationRow {
                            name: migration.name.to_owned(),
                            timestamp: migration.timestamp,
                        })
                        .execute(conn)
                        .await?;
                    Ok::<_, TxError>(ApplyOutcome::Applied)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        if outcome == ApplyOutcome::Applied {
            info!(migration = migration.name, "migration applied");
        }
        Ok(outcome)
    }

    async fn revert(
        &self,
        migration: &MigrationDefinition,
    ) -> Result<RevertOutcome, MigrationStoreError> {
        let migration = *migration;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                async move {
                    lock_log(conn).await?;

                    let recorded: i64 = migrations_history::table
                        .filter(migrations_history::name.eq(migration.name))
                        .count()
                        .get_result(conn)
                        .await?;
                    if recorded == 0 {
                        return Ok(RevertOutcome::NotRecorded);
                    }

                    run_statements(conn, migration.name, migration.down).await?;
                    diesel::delete(
                        migrations_history::table
                            .filter(migrations_history::name.eq(migration.name)),
                    )
                    .execute(conn)
                    .await?;
                    Ok::<_, TxError>(RevertOutcome::Reverted)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        if outcome == RevertOutcome::Reverted {
            info!(migration = migration.name, "migration reverted");
        }
        Ok(outcome)
    }
}
