//! Runner behaviour against an in-memory migration store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{Error, ErrorCode};
use crate::domain::ports::{
    ApplyOutcome, MigrationStore, MigrationStoreError, MockMigrationStore, RevertOutcome,
    SchemaMigrations,
};

const A: MigrationDefinition = MigrationDefinition {
    name: "100-A",
    timestamp: 100,
    up: &["CREATE TABLE a (id INT)"],
    down: &["DROP TABLE a"],
};
const B: MigrationDefinition = MigrationDefinition {
    name: "200-B",
    timestamp: 200,
    up: &["CREATE TABLE b (id INT)"],
    down: &["DROP TABLE b"],
};
const C: MigrationDefinition = MigrationDefinition {
    name: "300-C",
    timestamp: 300,
    up: &["CREATE TABLE c (id INT)"],
    down: &["DROP TABLE c"],
};

#[derive(Default)]
struct InMemoryMigrationStore {
    log: Mutex<Vec<MigrationRecord>>,
    failing: HashSet<&'static str>,
    writes: AtomicUsize,
}

impl InMemoryMigrationStore {
    fn failing_on(name: &'static str) -> Self {
        Self {
            failing: HashSet::from([name]),
            ..Self::default()
        }
    }

    fn seeded(records: &[MigrationDefinition]) -> Self {
        let store = Self::default();
        store
            .log
            .lock()
            .expect("log lock")
            .extend(records.iter().map(MigrationDefinition::record));
        store
    }

    fn names(&self) -> Vec<String> {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .map(|record| record.name.clone())
            .collect()
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MigrationStore for InMemoryMigrationStore {
    async fn ensure_log(&self) -> Result<(), MigrationStoreError> {
        Ok(())
    }

    async fn executed(&self) -> Result<Vec<MigrationRecord>, MigrationStoreError> {
        let mut records = self.log.lock().expect("log lock").clone();
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    async fn apply(
        &self,
        migration: &MigrationDefinition,
    ) -> Result<ApplyOutcome, MigrationStoreError> {
        if self.failing.contains(migration.name) {
            return Err(MigrationStoreError::statement(
                migration.name,
                "relation already exists",
            ));
        }
        let mut log = self.log.lock().expect("log lock");
        if log.iter().any(|record| record.name == migration.name) {
            return Ok(ApplyOutcome::AlreadyApplied);
        }
        log.push(migration.record());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(ApplyOutcome::Applied)
    }

    async fn revert(
        &self,
        migration: &MigrationDefinition,
    ) -> Result<RevertOutcome, MigrationStoreError> {
        let mut log = self.log.lock().expect("log lock");
        let before = log.len();
        log.retain(|record| record.name != migration.name);
        if log.len() == before {
            return Ok(RevertOutcome::NotRecorded);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(RevertOutcome::Reverted)
    }
}

#[fixture]
fn registry() -> MigrationRegistry {
    MigrationRegistry::new(vec![C, A, B]).expect("valid registry")
}

fn service(
    store: InMemoryMigrationStore,
    registry: MigrationRegistry,
) -> (Arc<InMemoryMigrationStore>, MigrationService<InMemoryMigrationStore>) {
    let store = Arc::new(store);
    (store.clone(), MigrationService::new(store, registry))
}

#[rstest]
#[tokio::test]
async fn run_all_applies_everything_in_order(registry: MigrationRegistry) {
    let (store, service) = service(InMemoryMigrationStore::default(), registry);

    let applied = service.run_all().await.expect("run all");
    assert_eq!(applied.len(), 3);

    let status = service.get_status().await.expect("status");
    assert!(status.pending.is_empty());
    assert_eq!(store.names(), ["100-A", "200-B", "300-C"]);
}

#[rstest]
#[tokio::test]
async fn run_all_twice_writes_nothing_the_second_time(registry: MigrationRegistry) {
    let (store, service) = service(InMemoryMigrationStore::default(), registry);

    service.run_all().await.expect("first run");
    let writes = store.writes();
    let applied = service.run_all().await.expect("second run");

    assert!(applied.is_empty());
    assert_eq!(store.writes(), writes);
    assert_eq!(store.names().len(), 3);
}

#[rstest]
#[tokio::test]
async fn run_all_stops_at_first_failure(registry: MigrationRegistry) {
    let (store, service) = service(InMemoryMigrationStore::failing_on("200-B"), registry);

    let err = service.run_all().await.expect_err("B fails");
    assert!(matches!(
        err,
        MigrationError::Store(MigrationStoreError::Statement { ref migration, .. }) if migration == "200-B"
    ));
    assert_eq!(store.names(), ["100-A"]);
}

#[rstest]
#[tokio::test]
async fn run_to_stops_at_the_target() {
    let registry = MigrationRegistry::new(vec![A, B]).expect("valid registry");
    let (_, service) = service(InMemoryMigrationStore::default(), registry);

    service.run_to("100-A").await.expect("run to A");
    let status = service.get_status().await.expect("status");

    assert_eq!(status.executed, vec![A.record()]);
    assert_eq!(status.pending, vec![PendingMigration::from(&B)]);
}

#[rstest]
#[tokio::test]
async fn run_to_unknown_target_is_not_found(registry: MigrationRegistry) {
    let (store, service) = service(InMemoryMigrationStore::default(), registry);

    let err = service.run_to("999-Missing").await.expect_err("unknown");
    assert_eq!(
        err,
        MigrationError::NotFound {
            name: "999-Missing".to_owned()
        }
    );
    assert_eq!(Error::from(err).code(), ErrorCode::NotFound);
    assert_eq!(store.writes(), 0);
}

#[rstest]
#[tokio::test]
async fn undo_last_reverts_only_the_latest(registry: MigrationRegistry) {
    let (store, service) = service(InMemoryMigrationStore::default(), registry);
    service.run_all().await.expect("run all");

    let reverted = service.undo_last().await.expect("undo");
    assert_eq!(reverted, C.record());
    assert_eq!(store.names(), ["100-A", "200-B"]);

    let status = service.get_status().await.expect("status");
    assert_eq!(status.pending, vec![PendingMigration::from(&C)]);
}

#[rstest]
#[tokio::test]
async fn undo_last_on_empty_log_fails(registry: MigrationRegistry) {
    let (_, service) = service(InMemoryMigrationStore::default(), registry);
    assert_eq!(
        service.undo_last().await,
        Err(MigrationError::NothingToUndo)
    );
}

#[rstest]
#[tokio::test]
async fn undo_last_rejects_unregistered_record() {
    let orphan = MigrationDefinition {
        name: "400-Orphan",
        timestamp: 400,
        up: &[],
        down: &[],
    };
    let registry = MigrationRegistry::new(vec![A]).expect("valid registry");
    let (store, service) = service(InMemoryMigrationStore::seeded(&[A, orphan]), registry);

    let err = service.undo_last().await.expect_err("orphan record");
    assert_eq!(
        err,
        MigrationError::UnknownRecord {
            name: "400-Orphan".to_owned()
        }
    );
    assert_eq!(store.writes(), 0);
}

#[rstest]
#[tokio::test]
async fn undo_last_reports_nothing_when_the_record_vanished_under_the_lock(
    registry: MigrationRegistry,
) {
    let mut store = MockMigrationStore::new();
    store.expect_ensure_log().return_once(|| Ok(()));
    store
        .expect_executed()
        .return_once(|| Ok(vec![A.record(), B.record()]));
    store
        .expect_revert()
        .withf(|migration| migration.name == B.name)
        .times(1)
        .return_once(|_| Ok(RevertOutcome::NotRecorded));
    let service = MigrationService::new(Arc::new(store), registry);

    let err = service.undo_last().await.expect_err("already reverted");
    assert_eq!(err, MigrationError::NothingToUndo);
}

#[rstest]
#[tokio::test]
async fn test_migrations_reports_each_outcome() {
    let registry = MigrationRegistry::new(vec![A, B, C]).expect("valid registry");
    let store = InMemoryMigrationStore::failing_on("300-C");
    store.log.lock().expect("log lock").push(A.record());
    let (_, service) = service(store, registry);

    let report = service.test_migrations().await.expect("report");

    assert!(!report.success);
    assert_eq!(
        report.summary,
        MigrationTestSummary {
            total: 3,
            executed: 1,
            failed: 1,
            skipped: 1,
        }
    );
    let statuses: Vec<_> = report
        .results
        .iter()
        .map(|result| (result.migration.as_str(), result.status))
        .collect();
    assert_eq!(
        statuses,
        [
            ("200-B", MigrationTestStatus::Success),
            ("300-C", MigrationTestStatus::Failed),
            ("100-A", MigrationTestStatus::Skipped),
        ]
    );
    assert_eq!(report.results[0].message, "Migration executed successfully");
    assert!(report.results[1].message.contains("300-C"));
    assert_eq!(report.results[2].message, "Migration already executed");
    assert_eq!(report.results[2].duration_ms, 0);
}

#[rstest]
#[tokio::test]
async fn health_reports_progress(registry: MigrationRegistry) {
    let (_, service) = service(InMemoryMigrationStore::seeded(&[A, B]), registry);

    let health = service.database_health().await;
    assert_eq!(
        health,
        DatabaseHealth {
            is_connected: true,
            pending_migrations: 1,
            last_migration: Some("200-B".to_owned()),
        }
    );
}

#[rstest]
#[tokio::test]
async fn health_absorbs_connection_failures(registry: MigrationRegistry) {
    let mut store = MockMigrationStore::new();
    store
        .expect_ensure_log()
        .times(1)
        .return_once(|| Err(MigrationStoreError::connection("refused")));
    let service = MigrationService::new(Arc::new(store), registry);

    let health = service.database_health().await;
    assert!(!health.is_connected);
    assert_eq!(health.pending_migrations, 0);
}

#[rstest]
#[tokio::test]
async fn driving_port_maps_connection_errors_to_service_unavailable(registry: MigrationRegistry) {
    let mut store = MockMigrationStore::new();
    store
        .expect_ensure_log()
        .return_once(|| Err(MigrationStoreError::connection("refused")));
    let service = MigrationService::new(Arc::new(store), registry);

    let err = SchemaMigrations::status(&service).await.expect_err("offline");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
