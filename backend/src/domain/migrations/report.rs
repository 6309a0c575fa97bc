//! Status and diagnostic reports produced by the migration runner.

use serde::Serialize;
use utoipa::ToSchema;

use super::definition::{MigrationDefinition, MigrationRecord};

/// Migration that is registered but absent from the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PendingMigration {
    pub name: String,
    pub timestamp: i64,
}

impl From<&MigrationDefinition> for PendingMigration {
    fn from(value: &MigrationDefinition) -> Self {
        Self {
            name: value.name.to_owned(),
            timestamp: value.timestamp,
        }
    }
}

/// Executed and pending migrations, both in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MigrationStatus {
    pub executed: Vec<MigrationRecord>,
    pub pending: Vec<PendingMigration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MigrationTestStatus {
    Success,
    Failed,
    Skipped,
}

/// Outcome of one migration during a test pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationTestResult {
    pub migration: String,
    pub status: MigrationTestStatus,
    pub message: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MigrationTestSummary {
    pub total: usize,
    pub executed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Report of a migration test pass. `success` holds when nothing failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MigrationTestReport {
    pub success: bool,
    pub results: Vec<MigrationTestResult>,
    pub summary: MigrationTestSummary,
}

impl MigrationTestReport {
    /// Build a report, deriving the summary from `results`.
    #[must_use]
    pub fn from_results(results: Vec<MigrationTestResult>) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        let summary = MigrationTestSummary {
            total: results.len(),
            executed: count(MigrationTestStatus::Success),
            failed: count(MigrationTestStatus::Failed),
            skipped: count(MigrationTestStatus::Skipped),
        };
        Self {
            success: summary.failed == 0,
            results,
            summary,
        }
    }
}

/// Snapshot of database reachability and migration progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub is_connected: bool,
    pub pending_migrations: usize,
    pub last_migration: Option<String>,
}
