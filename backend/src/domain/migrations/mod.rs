//! Versioned, reversible schema migrations.
//!
//! Definitions live in an immutable [`MigrationRegistry`]; the
//! [`MigrationService`] compares them with the migration log held behind the
//! `MigrationStore` port and applies or reverts them one transaction at a
//! time.

mod definition;
mod report;
mod service;

pub use definition::{MigrationDefinition, MigrationRecord, MigrationRegistry, RegistryError};
pub use report::{
    DatabaseHealth, MigrationStatus, MigrationTestReport, MigrationTestResult,
    MigrationTestStatus, MigrationTestSummary, PendingMigration,
};
pub use service::{MigrationError, MigrationService};

#[cfg(test)]
mod tests;
