//! Driving port for operator-triggered schema migrations.
//!
//! Inbound adapters (the admin HTTP surface and the CLI) use this port to
//! inspect and advance the schema without touching the store directly.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::migrations::{
    DatabaseHealth, MigrationRecord, MigrationStatus, MigrationTestReport,
};

/// Domain use-case port for schema migrations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaMigrations: Send + Sync {
    /// Executed and pending migrations.
    async fn status(&self) -> Result<MigrationStatus, Error>;

    /// Create the log if needed and apply everything pending.
    async fn initialize(&self) -> Result<Vec<MigrationRecord>, Error>;

    /// Apply every pending migration in order; returns the newly applied.
    async fn run_all(&self) -> Result<Vec<MigrationRecord>, Error>;

    /// Apply pending migrations up to and including `target`.
    async fn run_to(&self, target: &str) -> Result<Vec<MigrationRecord>, Error>;

    /// Revert the most recently applied migration.
    async fn undo_last(&self) -> Result<MigrationRecord, Error>;

    /// Apply each pending migration in turn and report the outcomes.
    async fn test_migrations(&self) -> Result<MigrationTestReport, Error>;

    /// Reachability and progress snapshot. Never fails.
    async fn database_health(&self) -> DatabaseHealth;
}
