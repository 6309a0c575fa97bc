//! Migration runner service.
//!
//! Computes the pending set from the registry and the log, then drives the
//! [`MigrationStore`] one migration at a time. Each migration is its own
//! transaction, so a failure on migration *k* leaves 1..k-1 committed.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::Error;
use crate::domain::ports::{
    ApplyOutcome, MigrationStore, MigrationStoreError, RevertOutcome, SchemaMigrations,
};

use super::definition::{MigrationDefinition, MigrationRecord, MigrationRegistry};
use super::report::{
    DatabaseHealth, MigrationStatus, MigrationTestReport, MigrationTestResult,
    MigrationTestStatus, PendingMigration,
};

const EXECUTED_MESSAGE: &str = "Migration executed successfully";
const SKIPPED_MESSAGE: &str = "Migration already executed";

/// Errors surfaced by the migration runner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Store(#[from] MigrationStoreError),
    #[error("Migration {name} not found")]
    NotFound { name: String },
    #[error("no executed migrations to revert")]
    NothingToUndo,
    #[error("executed migration {name} is not registered")]
    UnknownRecord { name: String },
}

impl From<MigrationError> for Error {
    fn from(value: MigrationError) -> Self {
        match value {
            MigrationError::Store(MigrationStoreError::Connection { message }) => {
                Error::service_unavailable(format!("database unavailable: {message}"))
            }
            MigrationError::Store(store) => Error::internal(store.to_string()),
            err @ MigrationError::NotFound { .. } => Error::not_found(err.to_string()),
            err @ MigrationError::NothingToUndo => Error::conflict(err.to_string()),
            err @ MigrationError::UnknownRecord { .. } => Error::internal(err.to_string()),
        }
    }
}

/// Runner over a [`MigrationStore`] and an immutable registry.
#[derive(Clone)]
pub struct MigrationService<S> {
    store: Arc<S>,
    registry: MigrationRegistry,
}

impl<S> MigrationService<S> {
    pub fn new(store: Arc<S>, registry: MigrationRegistry) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }
}

impl<S> MigrationService<S>
where
    S: MigrationStore,
{
    async fn executed_names(&self) -> Result<HashSet<String>, MigrationError> {
        self.store.ensure_log().await?;
        let executed = self.store.executed().await?;
        Ok(executed.into_iter().map(|record| record.name).collect())
    }

    async fn apply_pending(
        &self,
        candidates: &[MigrationDefinition],
    ) -> Result<Vec<MigrationRecord>, MigrationError> {
        let executed = self.executed_names().await?;
        let mut applied = Vec::new();

        for definition in candidates
            .iter()
            .filter(|definition| !executed.contains(definition.name))
        {
            info!(migration = definition.name, "applying migration");
            match self.store.apply(definition).await {
                Ok(ApplyOutcome::Applied) => applied.push(definition.record()),
                Ok(ApplyOutcome::AlreadyApplied) => {
                    debug!(migration = definition.name, "migration applied concurrently");
                }
                Err(err) => {
                    error!(migration = definition.name, error = %err, "migration failed");
                    return Err(err.into());
                }
            }
        }

        info!(applied = applied.len(), "migrations complete");
        Ok(applied)
    }

    /// Executed and pending migrations.
    pub async fn get_status(&self) -> Result<MigrationStatus, MigrationError> {
        self.store.ensure_log().await?;
        let executed = self.store.executed().await?;
        let names: HashSet<&str> = executed.iter().map(|record| record.name.as_str()).collect();
        let pending = self
            .registry
            .iter()
            .filter(|definition| !names.contains(definition.name))
            .map(PendingMigration::from)
            .collect();
        Ok(MigrationStatus { executed, pending })
    }

    /// Apply every pending migration in ascending order.
    pub async fn run_all(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        self.apply_pending(self.registry.as_slice()).await
    }

    /// Apply pending migrations up to and including `target`.
    pub async fn run_to(&self, target: &str) -> Result<Vec<MigrationRecord>, MigrationError> {
        let candidates = self
            .registry
            .up_to(target)
            .ok_or_else(|| MigrationError::NotFound {
                name: target.to_owned(),
            })?;
        self.apply_pending(candidates).await
    }

    /// Revert the most recent migration and delete its record.
    pub async fn undo_last(&self) -> Result<MigrationRecord, MigrationError> {
        self.store.ensure_log().await?;
        let last = self
            .store
            .executed()
            .await?
            .into_iter()
            .max_by_key(|record| record.timestamp)
            .ok_or(MigrationError::NothingToUndo)?;
        let definition =
            self.registry
                .find(&last.name)
                .ok_or_else(|| MigrationError::UnknownRecord {
                    name: last.name.clone(),
                })?;

        info!(migration = definition.name, "reverting migration");
        match self.store.revert(definition).await? {
            RevertOutcome::Reverted => Ok(last),
            // Another runner reverted it between the log read and the lock.
            RevertOutcome::NotRecorded => {
                warn!(migration = definition.name, "migration already reverted");
                Err(MigrationError::NothingToUndo)
            }
        }
    }

    /// Ensure the log exists and apply everything pending.
    pub async fn initialize(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        self.run_all().await
    }

    /// Run each pending migration via [`Self::run_to`] and report outcomes.
    ///
    /// Failures do not stop the pass. A later migration re-attempts any
    /// earlier failed one, so it is reported failed as well.
    pub async fn test_migrations(&self) -> Result<MigrationTestReport, MigrationError> {
        let status = self.get_status().await?;
        let mut results = Vec::with_capacity(status.pending.len() + status.executed.len());

        for pending in &status.pending {
            let started = Instant::now();
            let outcome = self.run_to(&pending.name).await;
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            let (status, message) = match outcome {
                Ok(_) => (MigrationTestStatus::Success, EXECUTED_MESSAGE.to_owned()),
                Err(err) => (MigrationTestStatus::Failed, err.to_string()),
            };
            results.push(MigrationTestResult {
                migration: pending.name.clone(),
                status,
                message,
                duration_ms,
            });
        }

        results.extend(status.executed.into_iter().map(|record| MigrationTestResult {
            migration: record.name,
            status: MigrationTestStatus::Skipped,
            message: SKIPPED_MESSAGE.to_owned(),
            duration_ms: 0,
        }));

        Ok(MigrationTestReport::from_results(results))
    }

    /// Connectivity and progress snapshot; failures yield `is_connected = false`.
    pub async fn database_health(&self) -> DatabaseHealth {
        match self.get_status().await {
            Ok(status) => DatabaseHealth {
                is_connected: true,
                pending_migrations: status.pending.len(),
                last_migration: status.executed.last().map(|record| record.name.clone()),
            },
            Err(err) => {
                warn!(error = %err, "database health check failed");
                DatabaseHealth::default()
            }
        }
    }
}

#[async_trait]
impl<S> SchemaMigrations for MigrationService<S>
where
    S: MigrationStore,
{
    async fn status(&self) -> Result<MigrationStatus, Error> {
        Ok(self.get_status().await?)
    }

    async fn initialize(&self) -> Result<Vec<MigrationRecord>, Error> {
        Ok(MigrationService::initialize(self).await?)
    }

    async fn run_all(&self) -> Result<Vec<MigrationRecord>, Error> {
        Ok(MigrationService::run_all(self).await?)
    }

    async fn run_to(&self, target: &str) -> Result<Vec<MigrationRecord>, Error> {
        Ok(MigrationService::run_to(self, target).await?)
    }

    async fn undo_last(&self) -> Result<MigrationRecord, Error> {
        Ok(MigrationService::undo_last(self).await?)
    }

    async fn test_migrations(&self) -> Result<MigrationTestReport, Error> {
        Ok(MigrationService::test_migrations(self).await?)
    }

    async fn database_health(&self) -> DatabaseHealth {
        MigrationService::database_health(self).await
    }
}
