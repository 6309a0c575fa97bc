//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler in the inbound HTTP layer together with
//! the domain types they exchange. Swagger UI serves it in debug builds and
//! `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::migrations::{
    DatabaseHealth, MigrationRecord, MigrationStatus, MigrationTestReport, MigrationTestResult,
    MigrationTestStatus, MigrationTestSummary, PendingMigration,
};
use crate::domain::ports::UserListing;
use crate::domain::test_data::{SeedOutcome, SeedStep, UserValidationReport};
use crate::domain::{
    Answer, AnswerView, AuthorProfile, AuthorSummary, Coupon, Error, ErrorCode, Question,
    QuestionDetail, QuestionListing, Redemption, Role, SelfTestReport, User, UserCounts,
    UserSummary, VoteDirection,
};
use crate::inbound::http::accounts::{
    CheckIdRequest, CheckIdResponse, LoginRequest, LoginResponse, RegisterRequest,
};
use crate::inbound::http::admin::AdminEnvelope;
use crate::inbound::http::answers::AnswerRequest;
use crate::inbound::http::coupons::{PointsResponse, RedeemRequest};
use crate::inbound::http::questions::{CreateQuestionRequest, UpdateQuestionRequest, VoteRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Q&A backend API",
        description = "Questions, answers, coupons and the operator migration surface."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::check_id,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::search_users,
        crate::inbound::http::questions::list_questions,
        crate::inbound::http::questions::create_question,
        crate::inbound::http::questions::get_question,
        crate::inbound::http::questions::update_question,
        crate::inbound::http::questions::delete_question,
        crate::inbound::http::questions::vote_question,
        crate::inbound::http::answers::list_answers,
        crate::inbound::http::answers::create_answer,
        crate::inbound::http::answers::get_answer,
        crate::inbound::http::answers::update_answer,
        crate::inbound::http::answers::delete_answer,
        crate::inbound::http::answers::vote_answer,
        crate::inbound::http::answers::accept_answer,
        crate::inbound::http::coupons::list_coupons,
        crate::inbound::http::coupons::redeem_coupon,
        crate::inbound::http::coupons::current_points,
        crate::inbound::http::admin::init_database,
        crate::inbound::http::admin::run_migrations,
        crate::inbound::http::admin::revert_migration,
        crate::inbound::http::admin::run_migrations_to,
        crate::inbound::http::admin::migration_status,
        crate::inbound::http::admin::database_status,
        crate::inbound::http::admin::validate_users,
        crate::inbound::http::admin::seed_test_data,
        crate::inbound::http::admin::clear_test_data,
        crate::inbound::http::admin::test_migrations,
        crate::inbound::http::admin::full_test,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserSummary,
        UserCounts,
        UserListing,
        Role,
        Question,
        QuestionListing,
        QuestionDetail,
        AuthorSummary,
        AuthorProfile,
        Answer,
        AnswerView,
        VoteDirection,
        Coupon,
        Redemption,
        CheckIdRequest,
        CheckIdResponse,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        CreateQuestionRequest,
        UpdateQuestionRequest,
        VoteRequest,
        AnswerRequest,
        RedeemRequest,
        PointsResponse,
        AdminEnvelope,
        MigrationRecord,
        PendingMigration,
        MigrationStatus,
        MigrationTestStatus,
        MigrationTestResult,
        MigrationTestSummary,
        MigrationTestReport,
        DatabaseHealth,
        SeedStep,
        SeedOutcome,
        UserValidationReport,
        SelfTestReport,
    )),
    tags(
        (name = "accounts", description = "Registration and sessions"),
        (name = "users", description = "Public user directory"),
        (name = "questions", description = "Questions and votes"),
        (name = "answers", description = "Answers, votes and acceptance"),
        (name = "coupons", description = "Coupon redemption and points"),
        (name = "admin", description = "Schema migrations and test data"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .iter()
            .find(|(key, _)| key.rsplit('.').next() == Some(name))
            .map(|(_, schema)| schema)
            .unwrap_or_else(|| panic!("schema {name} registered"));
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message"])]
    #[case("User", &["id", "loginId", "role", "points"])]
    #[case("AdminEnvelope", &["success", "message", "error", "data"])]
    #[case("LoginResponse", &["message", "userId", "mbrId"])]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let present = schema_fields(name);
        for field in fields {
            assert!(present.iter().any(|f| f == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/questions/{id}/answers/{answer_id}/accept")]
    #[case("/api/v1/coupons/redeem")]
    #[case("/api/v1/migration/full-test")]
    #[case("/health/ready")]
    fn document_lists_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
