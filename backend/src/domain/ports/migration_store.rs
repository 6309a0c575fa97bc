//! Port abstraction for the migration log and statement execution.

use async_trait::async_trait;

use crate::domain::migrations::{MigrationDefinition, MigrationRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by migration store adapters.
    pub enum MigrationStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "migration store connection failed: {message}",
        /// Reading or writing the log failed.
        Query { message: String } => "migration store query failed: {message}",
        /// A migration statement failed; the transaction was rolled back.
        Statement { migration: String, message: String } =>
            "migration {migration} failed: {message}",
    }
}

/// Result of asking the store to apply a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Statements ran and the log record was written.
    Applied,
    /// The log already held the record; nothing ran.
    AlreadyApplied,
}

/// Result of asking the store to revert a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    /// Statements ran and the log record was deleted.
    Reverted,
    /// The log no longer held the record; nothing ran.
    NotRecorded,
}

/// Port for reading the migration log and running migrations.
///
/// Implementations must:
/// - run `up` statements and the log insert in one transaction;
/// - run `down` statements and the log delete in one transaction;
/// - re-check the log inside the apply transaction and return
///   [`ApplyOutcome::AlreadyApplied`] instead of re-running statements;
/// - re-check the log inside the revert transaction and return
///   [`RevertOutcome::NotRecorded`] instead of running `down` twice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MigrationStore: Send + Sync {
    /// Create the log table when missing.
    async fn ensure_log(&self) -> Result<(), MigrationStoreError>;

    /// Executed migrations in ascending timestamp order.
    async fn executed(&self) -> Result<Vec<MigrationRecord>, MigrationStoreError>;

    /// Apply a migration and record it.
    async fn apply(
        &self,
        migration: &MigrationDefinition,
    ) -> Result<ApplyOutcome, MigrationStoreError>;

    /// Revert a migration and delete its record.
    async fn revert(
        &self,
        migration: &MigrationDefinition,
    ) -> Result<RevertOutcome, MigrationStoreError>;
}
