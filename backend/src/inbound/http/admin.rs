//! Operator endpoints for migrations, seeding and diagnostics.
//!
//! Every response is an [`AdminEnvelope`]. Failures keep the HTTP status of
//! the underlying error kind and carry its message in `error`.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::{Error, full_self_test};
use crate::inbound::http::error::status_for;
use crate::inbound::http::state::AdminState;

/// Uniform admin response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

fn reply(success: bool, message: impl Into<String>, data: Option<Value>) -> HttpResponse {
    HttpResponse::Ok().json(AdminEnvelope {
        success,
        message: message.into(),
        error: None,
        data,
    })
}

fn reply_with<T: Serialize>(success: bool, message: impl Into<String>, data: &T) -> HttpResponse {
    match serde_json::to_value(data) {
        Ok(value) => reply(success, message, Some(value)),
        Err(err) => failure(
            "Failed to encode response",
            &Error::internal(format!("serialisation failed: {err}")),
        ),
    }
}

fn failure(message: &str, err: &Error) -> HttpResponse {
    error!(code = ?err.code(), error = %err.message(), "{message}");
    HttpResponse::build(status_for(err.code())).json(AdminEnvelope {
        success: false,
        message: message.to_owned(),
        error: Some(err.message().to_owned()),
        data: None,
    })
}

/// Create the migration log and apply everything pending.
#[utoipa::path(
    post,
    path = "/api/v1/migration/init",
    responses(
        (status = 200, description = "Initialised", body = AdminEnvelope),
        (status = 500, description = "Initialisation failed", body = AdminEnvelope),
        (status = 503, description = "Database unavailable", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "initDatabase"
)]
#[post("/init")]
pub async fn init_database(state: web::Data<AdminState>) -> HttpResponse {
    match state.migrations.initialize().await {
        Ok(applied) => {
            info!(applied = applied.len(), "database initialised");
            reply_with(true, "Database initialized successfully", &applied)
        }
        Err(err) => failure("Database initialization failed", &err),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/migration/run",
    responses(
        (status = 200, description = "Pending migrations applied", body = AdminEnvelope),
        (status = 500, description = "A migration failed", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "runMigrations"
)]
#[post("/run")]
pub async fn run_migrations(state: web::Data<AdminState>) -> HttpResponse {
    match state.migrations.run_all().await {
        Ok(applied) => reply_with(true, "Migrations executed successfully", &applied),
        Err(err) => failure("Migration execution failed", &err),
    }
}

/// Revert the most recently applied migration.
#[utoipa::path(
    post,
    path = "/api/v1/migration/revert",
    responses(
        (status = 200, description = "Reverted", body = AdminEnvelope),
        (status = 409, description = "Nothing to revert", body = AdminEnvelope),
        (status = 500, description = "Revert failed", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "revertMigration"
)]
#[post("/revert")]
pub async fn revert_migration(state: web::Data<AdminState>) -> HttpResponse {
    match state.migrations.undo_last().await {
        Ok(record) => reply_with(true, "Migration reverted successfully", &record),
        Err(err) => failure("Migration revert failed", &err),
    }
}

/// Apply pending migrations up to and including `name`.
#[utoipa::path(
    post,
    path = "/api/v1/migration/run-to/{name}",
    params(("name" = String, Path, description = "Migration name")),
    responses(
        (status = 200, description = "Applied", body = AdminEnvelope),
        (status = 404, description = "Unknown migration", body = AdminEnvelope),
        (status = 500, description = "A migration failed", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "runMigrationsTo"
)]
#[post("/run-to/{name}")]
pub async fn run_migrations_to(
    state: web::Data<AdminState>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    match state.migrations.run_to(&name).await {
        Ok(applied) => reply_with(true, format!("Migrations executed up to {name}"), &applied),
        Err(err) => failure("Failed to run migrations", &err),
    }
}

/// Executed and pending migrations.
#[utoipa::path(
    get,
    path = "/api/v1/migration/migrations",
    responses(
        (status = 200, description = "Migration status", body = AdminEnvelope),
        (status = 503, description = "Database unavailable", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "migrationStatus"
)]
#[get("/migrations")]
pub async fn migration_status(state: web::Data<AdminState>) -> HttpResponse {
    match state.migrations.status().await {
        Ok(status) => reply_with(true, "Migration status retrieved", &status),
        Err(err) => failure("Failed to get migration status", &err),
    }
}

/// Database health plus user statistics.
#[utoipa::path(
    get,
    path = "/api/v1/migration/status",
    responses(
        (status = 200, description = "Database status", body = AdminEnvelope),
        (status = 503, description = "Database unavailable", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "databaseStatus"
)]
#[get("/status")]
pub async fn database_status(state: web::Data<AdminState>) -> HttpResponse {
    let database = state.migrations.database_health().await;
    match state.test_data.stats().await {
        Ok(statistics) => reply(
            true,
            "Database status retrieved",
            Some(json!({ "database": database, "statistics": statistics })),
        ),
        Err(err) => failure("Database status check failed", &err),
    }
}

/// Check the reference users. `success` mirrors the report's validity.
#[utoipa::path(
    get,
    path = "/api/v1/migration/validate-users",
    responses((status = 200, description = "Validation report", body = AdminEnvelope)),
    tags = ["admin"],
    operation_id = "validateUsers"
)]
#[get("/validate-users")]
pub async fn validate_users(state: web::Data<AdminState>) -> HttpResponse {
    let report = state.test_data.validate_users().await;
    let message = if report.is_valid {
        "User data is valid"
    } else {
        "User data validation failed"
    };
    reply_with(report.is_valid, message, &report)
}

#[utoipa::path(
    post,
    path = "/api/v1/migration/seed",
    responses(
        (status = 200, description = "Seeded", body = AdminEnvelope),
        (status = 500, description = "Seeding failed", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "seedTestData"
)]
#[post("/seed")]
pub async fn seed_test_data(state: web::Data<AdminState>) -> HttpResponse {
    match state.test_data.seed().await {
        Ok(outcome) => reply_with(true, "Test data seeded successfully", &outcome),
        Err(err) => failure("Test data seeding failed", &err),
    }
}

/// Delete every question, then every user.
#[utoipa::path(
    delete,
    path = "/api/v1/migration/clear",
    responses(
        (status = 200, description = "Cleared", body = AdminEnvelope),
        (status = 500, description = "Clearing failed", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "clearTestData"
)]
#[delete("/clear")]
pub async fn clear_test_data(state: web::Data<AdminState>) -> HttpResponse {
    match state.test_data.clear().await {
        Ok(()) => reply(true, "Test data cleared successfully", None),
        Err(err) => failure("Test data clearing failed", &err),
    }
}

/// Apply each pending migration in turn and report per-migration outcomes.
#[utoipa::path(
    post,
    path = "/api/v1/migration/test",
    responses(
        (status = 200, description = "Migration test report", body = AdminEnvelope),
        (status = 500, description = "Test could not run", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "testMigrations"
)]
#[post("/test")]
pub async fn test_migrations(state: web::Data<AdminState>) -> HttpResponse {
    match state.migrations.test_migrations().await {
        Ok(report) => {
            let message = if report.success {
                "All migrations tested successfully".to_owned()
            } else {
                format!(
                    "Migration tests completed with {} failures",
                    report.summary.failed
                )
            };
            reply_with(report.success, message, &report)
        }
        Err(err) => failure("Migration testing failed", &err),
    }
}

/// Initialise, test migrations, validate users and report health.
#[utoipa::path(
    post,
    path = "/api/v1/migration/full-test",
    responses(
        (status = 200, description = "Self-test report", body = AdminEnvelope),
        (status = 500, description = "Self-test could not run", body = AdminEnvelope)
    ),
    tags = ["admin"],
    operation_id = "fullTest"
)]
#[post("/full-test")]
pub async fn full_test(state: web::Data<AdminState>) -> HttpResponse {
    match full_self_test(state.migrations.as_ref(), state.test_data.as_ref()).await {
        Ok(report) => {
            let message = if report.success {
                "Full database test completed successfully"
            } else {
                "Full database test completed with issues"
            };
            reply_with(report.success, message, &report)
        }
        Err(err) => failure("Full database test failed", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    use crate::domain::UserCounts;
    use crate::domain::migrations::{
        DatabaseHealth, MigrationRecord, MigrationStatus, MigrationTestReport,
        MigrationTestResult, MigrationTestStatus, PendingMigration,
    };
    use crate::domain::ports::{MockSchemaMigrations, MockTestDataCommand};
    use crate::domain::test_data::{SeedOutcome, SeedStep, UserValidationReport};

    fn admin_app(
        migrations: MockSchemaMigrations,
        test_data: MockTestDataCommand,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = AdminState {
            migrations: Arc::new(migrations),
            test_data: Arc::new(test_data),
        };
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api/v1/migration").configure(super::super::configure_admin))
    }

    fn record(name: &str, timestamp: i64) -> MigrationRecord {
        MigrationRecord {
            name: name.to_owned(),
            timestamp,
        }
    }

    fn health() -> DatabaseHealth {
        DatabaseHealth {
            is_connected: true,
            pending_migrations: 0,
            last_migration: Some("1756540001000-SeedCoupons".to_owned()),
        }
    }

    async fn call(
        migrations: MockSchemaMigrations,
        test_data: MockTestDataCommand,
        request: actix_test::TestRequest,
    ) -> (StatusCode, AdminEnvelope) {
        let app = actix_test::init_service(admin_app(migrations, test_data)).await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body: AdminEnvelope = actix_test::read_body_json(response).await;
        (status, body)
    }

    #[actix_web::test]
    async fn init_reports_applied_migrations() {
        let mut migrations = MockSchemaMigrations::new();
        migrations
            .expect_initialize()
            .times(1)
            .return_once(|| Ok(vec![record("1756000000000-CreateUsers", 1_756_000_000_000)]));
        let (status, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post().uri("/api/v1/migration/init"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.message, "Database initialized successfully");
        let data = body.data.expect("data present");
        assert_eq!(data[0]["name"], "1756000000000-CreateUsers");
    }

    #[rstest]
    #[case(Error::service_unavailable("pool timed out"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("syntax error at or near"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[actix_web::test]
    async fn run_failures_keep_error_status(#[case] error: Error, #[case] expected: StatusCode) {
        let message = error.message().to_owned();
        let mut migrations = MockSchemaMigrations::new();
        migrations.expect_run_all().return_once(move || Err(error));
        let (status, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post().uri("/api/v1/migration/run"),
        )
        .await;

        assert_eq!(status, expected);
        assert!(!body.success);
        assert_eq!(body.message, "Migration execution failed");
        assert_eq!(body.error.as_deref(), Some(message.as_str()));
        assert!(body.data.is_none());
    }

    #[actix_web::test]
    async fn revert_with_empty_log_is_a_conflict() {
        let mut migrations = MockSchemaMigrations::new();
        migrations
            .expect_undo_last()
            .return_once(|| Err(Error::conflict("no migrations to revert")));
        let (status, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post().uri("/api/v1/migration/revert"),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.message, "Migration revert failed");
    }

    #[actix_web::test]
    async fn run_to_unknown_name_is_not_found() {
        let mut migrations = MockSchemaMigrations::new();
        migrations
            .expect_run_to()
            .withf(|name| name == "nope")
            .return_once(|_| Err(Error::not_found("migration nope is not registered")));
        let (status, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post().uri("/api/v1/migration/run-to/nope"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Failed to run migrations");
    }

    #[actix_web::test]
    async fn run_to_names_the_target() {
        let mut migrations = MockSchemaMigrations::new();
        migrations
            .expect_run_to()
            .withf(|name| name == "1756000000000-CreateUsers")
            .return_once(|_| Ok(Vec::new()));
        let (_, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post()
                .uri("/api/v1/migration/run-to/1756000000000-CreateUsers"),
        )
        .await;

        assert_eq!(
            body.message,
            "Migrations executed up to 1756000000000-CreateUsers"
        );
    }

    #[actix_web::test]
    async fn migrations_lists_executed_and_pending() {
        let mut migrations = MockSchemaMigrations::new();
        migrations.expect_status().return_once(|| {
            Ok(MigrationStatus {
                executed: vec![record("A", 100)],
                pending: vec![PendingMigration {
                    name: "B".to_owned(),
                    timestamp: 200,
                }],
            })
        });
        let (_, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::get().uri("/api/v1/migration/migrations"),
        )
        .await;

        let data = body.data.expect("data present");
        assert_eq!(data["executed"][0]["name"], "A");
        assert_eq!(data["pending"][0]["name"], "B");
    }

    #[actix_web::test]
    async fn status_combines_health_and_statistics() {
        let mut migrations = MockSchemaMigrations::new();
        migrations.expect_database_health().return_once(health);
        let mut test_data = MockTestDataCommand::new();
        test_data.expect_stats().return_once(|| {
            Ok(UserCounts {
                total_users: 6,
                admin_users: 1,
                regular_users: 5,
            })
        });
        let (status, body) = call(
            migrations,
            test_data,
            actix_test::TestRequest::get().uri("/api/v1/migration/status"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body.data.expect("data present");
        assert_eq!(data["database"]["isConnected"], true);
        assert_eq!(data["statistics"]["totalUsers"], 6);
    }

    #[rstest]
    #[case(true, "User data is valid")]
    #[case(false, "User data validation failed")]
    #[actix_web::test]
    async fn validate_users_mirrors_report(#[case] valid: bool, #[case] message: &str) {
        let mut test_data = MockTestDataCommand::new();
        test_data.expect_validate_users().return_once(move || UserValidationReport {
            is_valid: valid,
            ..UserValidationReport::default()
        });
        let (status, body) = call(
            MockSchemaMigrations::new(),
            test_data,
            actix_test::TestRequest::get().uri("/api/v1/migration/validate-users"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.success, valid);
        assert_eq!(body.message, message);
    }

    #[actix_web::test]
    async fn seed_and_clear_report_success() {
        let mut test_data = MockTestDataCommand::new();
        test_data.expect_seed().return_once(|| {
            Ok(SeedOutcome {
                users: SeedStep::Applied,
                questions: SeedStep::AlreadySeeded,
            })
        });
        test_data.expect_clear().return_once(|| Ok(()));
        let app = actix_test::init_service(admin_app(MockSchemaMigrations::new(), test_data)).await;

        let seed = actix_test::TestRequest::post()
            .uri("/api/v1/migration/seed")
            .to_request();
        let body: AdminEnvelope = actix_test::call_and_read_body_json(&app, seed).await;
        assert_eq!(body.message, "Test data seeded successfully");
        assert_eq!(
            body.data.expect("data present")["questions"],
            "already_seeded"
        );

        let clear = actix_test::TestRequest::delete()
            .uri("/api/v1/migration/clear")
            .to_request();
        let body: AdminEnvelope = actix_test::call_and_read_body_json(&app, clear).await;
        assert!(body.success);
        assert!(body.data.is_none());
    }

    #[actix_web::test]
    async fn migration_test_counts_failures_in_message() {
        let mut migrations = MockSchemaMigrations::new();
        migrations.expect_test_migrations().return_once(|| {
            Ok(MigrationTestReport::from_results(vec![
                MigrationTestResult {
                    migration: "A".to_owned(),
                    status: MigrationTestStatus::Success,
                    message: String::new(),
                    duration_ms: 1,
                },
                MigrationTestResult {
                    migration: "B".to_owned(),
                    status: MigrationTestStatus::Failed,
                    message: "boom".to_owned(),
                    duration_ms: 1,
                },
            ]))
        });
        let (status, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post().uri("/api/v1/migration/test"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert_eq!(body.message, "Migration tests completed with 1 failures");
    }

    #[actix_web::test]
    async fn full_test_reports_issues() {
        let mut migrations = MockSchemaMigrations::new();
        migrations.expect_initialize().return_once(|| Ok(Vec::new()));
        migrations
            .expect_test_migrations()
            .return_once(|| Ok(MigrationTestReport::from_results(Vec::new())));
        migrations.expect_database_health().return_once(health);
        let mut test_data = MockTestDataCommand::new();
        test_data
            .expect_validate_users()
            .return_once(UserValidationReport::default);
        let (status, body) = call(
            migrations,
            test_data,
            actix_test::TestRequest::post().uri("/api/v1/migration/full-test"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert_eq!(body.message, "Full database test completed with issues");
        let data = body.data.expect("data present");
        assert_eq!(data["databaseHealth"]["isConnected"], true);
        assert_eq!(data["userValidation"]["isValid"], false);
    }

    #[actix_web::test]
    async fn full_test_aborts_when_initialisation_fails() {
        let mut migrations = MockSchemaMigrations::new();
        migrations
            .expect_initialize()
            .return_once(|| Err(Error::service_unavailable("database unreachable")));
        let (status, body) = call(
            migrations,
            MockTestDataCommand::new(),
            actix_test::TestRequest::post().uri("/api/v1/migration/full-test"),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.message, "Full database test failed");
    }
}
