//! Registration, login and logout handlers.
//!
//! ```text
//! POST /api/v1/register/check-id {"userId":"kim"}
//! POST /api/v1/register {"userId":"kim","password":"pw","name":"Kim",...}
//! POST /api/v1/login {"userId":"kim","password":"pw"}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginId, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{login_id_error, login_validation_error};

/// Body for `POST /api/v1/register/check-id`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckIdRequest {
    pub user_id: String,
}

/// Availability of a login id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckIdResponse {
    pub available: bool,
    pub message: String,
}

/// Body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: String,
    pub mbr_id: i32,
}

/// Check whether a login id is still free.
#[utoipa::path(
    post,
    path = "/api/v1/register/check-id",
    request_body = CheckIdRequest,
    responses(
        (status = 200, description = "Availability", body = CheckIdResponse),
        (status = 400, description = "Invalid login id", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "checkId",
    security([])
)]
#[post("/register/check-id")]
pub async fn check_id(
    state: web::Data<HttpState>,
    payload: web::Json<CheckIdRequest>,
) -> ApiResult<web::Json<CheckIdResponse>> {
    let login_id = LoginId::new(&payload.user_id).map_err(|err| login_id_error(&err))?;
    let available = state.accounts.login_id_available(&login_id).await?;
    let message = if available {
        "Login id is available"
    } else {
        "Login id is already in use"
    };
    Ok(web::Json(CheckIdResponse {
        available,
        message: message.to_owned(),
    }))
}

/// Create a member account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Login id already taken", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        user_id,
        password,
        name,
        email,
        phone,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&user_id, &password, &name, &email, &phone)
        .map_err(|err| login_validation_error(&err))?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Login success",
            body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))
        ),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.user_id, &payload.password)
        .map_err(|err| login_validation_error(&err))?;
    let mbr_id = state.accounts.authenticate(&credentials).await?;
    session.persist_user(mbr_id)?;
    info!(login_id = %credentials.login_id(), mbr_id = mbr_id.get(), "member logged in");
    Ok(web::Json(LoginResponse {
        message: "Login successful".to_owned(),
        user_id: credentials.login_id().to_string(),
        mbr_id: mbr_id.get(),
    }))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::{Role, UserId};
    use crate::inbound::http::test_utils::{MockPorts, api_test_app, session_cookie};

    fn stored_user() -> User {
        let at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).single().expect("valid time");
        User {
            id: UserId::new(7),
            login_id: LoginId::new("kim").expect("valid login id"),
            name: "Kim".to_owned(),
            email: "kim@example.com".to_owned(),
            phone: "010-1234-5678".to_owned(),
            role: Role::User,
            reputation: 0,
            points: 0,
            image: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    #[case(true, "Login id is available")]
    #[case(false, "Login id is already in use")]
    #[actix_web::test]
    async fn check_id_reports_availability(#[case] available: bool, #[case] message: &str) {
        let mut ports = MockPorts::default();
        ports
            .accounts
            .expect_login_id_available()
            .withf(|id| id.as_ref() == "kim")
            .times(1)
            .return_once(move |_| Ok(available));
        let app = actix_test::init_service(api_test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register/check-id")
            .set_json(json!({"userId": " kim "}))
            .to_request();
        let body: CheckIdResponse = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body.available, available);
        assert_eq!(body.message, message);
    }

    #[actix_web::test]
    async fn register_rejects_invalid_email_before_touching_the_service() {
        let app = actix_test::init_service(api_test_app(MockPorts::default())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "userId": "kim",
                "password": "pw",
                "name": "Kim",
                "email": "not-an-email",
                "phone": "010"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "email");
    }

    #[actix_web::test]
    async fn register_returns_created_user_without_password() {
        let mut ports = MockPorts::default();
        ports
            .accounts
            .expect_register()
            .times(1)
            .return_once(|_| Ok(stored_user()));
        let app = actix_test::init_service(api_test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "userId": "kim",
                "password": "secret",
                "name": "Kim",
                "email": "kim@example.com",
                "phone": "010-1234-5678"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["loginId"], "kim");
        assert!(body.get("password").is_none());
    }

    #[actix_web::test]
    async fn duplicate_registration_is_a_conflict() {
        let mut ports = MockPorts::default();
        ports
            .accounts
            .expect_register()
            .return_once(|_| Err(Error::conflict("login id kim is already taken")));
        let app = actix_test::init_service(api_test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "userId": "kim",
                "password": "secret",
                "name": "Kim",
                "email": "kim@example.com",
                "phone": "010"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn login_sets_session_cookie_and_logout_clears_it() {
        let mut ports = MockPorts::default();
        ports
            .accounts
            .expect_authenticate()
            .withf(|creds| creds.login_id().as_ref() == "kim" && creds.password() == "secret")
            .times(1)
            .return_once(|_| Ok(UserId::new(7)));
        ports
            .coupons
            .expect_points()
            .with(eq(UserId::new(7)))
            .times(1)
            .return_once(|_| Ok(120));
        let app = actix_test::init_service(api_test_app(ports)).await;

        let login_req = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"userId": "kim", "password": "secret"}))
            .to_request();
        let response = actix_test::call_service(&app, login_req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let body: LoginResponse = actix_test::read_body_json(response).await;
        assert_eq!(body.mbr_id, 7);
        assert_eq!(body.user_id, "kim");

        let points = actix_test::TestRequest::get()
            .uri("/api/v1/coupons/points")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(actix_test::call_service(&app, points).await.status(), StatusCode::OK);

        let logout_req = actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, logout_req).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared = session_cookie(&response);

        let points = actix_test::TestRequest::get()
            .uri("/api/v1/coupons/points")
            .cookie(cleared)
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, points).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let mut ports = MockPorts::default();
        ports
            .accounts
            .expect_authenticate()
            .return_once(|_| Err(Error::unauthorized("invalid credentials")));
        let app = actix_test::init_service(api_test_app(ports)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"userId": "kim", "password": "wrong"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "invalid credentials");
    }
}
