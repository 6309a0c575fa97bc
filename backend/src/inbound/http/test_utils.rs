//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    MockAccountService, MockAnswerBoard, MockCouponWallet, MockQuestionBoard, MockUsersQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Session middleware for tests: fresh key, cookie `session`, no `Secure`.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Mocked ports; set expectations on the ones a test exercises.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountService,
    pub users: MockUsersQuery,
    pub questions: MockQuestionBoard,
    pub answers: MockAnswerBoard,
    pub coupons: MockCouponWallet,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            accounts: Arc::new(self.accounts),
            users: Arc::new(self.users),
            questions: Arc::new(self.questions),
            answers: Arc::new(self.answers),
            coupons: Arc::new(self.coupons),
        }
    }
}

async fn sign_in_as(session: SessionContext, id: web::Path<i32>) -> Result<HttpResponse, Error> {
    session.persist_user(UserId::new(id.into_inner()))?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with every API handler under `/api/v1` plus `GET /test/sign-in/{id}`.
pub fn api_test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .wrap(test_session_middleware())
        .route("/test/sign-in/{id}", web::get().to(sign_in_as))
        .service(web::scope("/api/v1").configure(super::configure_api))
}

/// Session cookie for member `id`.
pub async fn sign_in<S>(app: &S, id: i32) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::get()
        .uri(&format!("/test/sign-in/{id}"))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success());
    session_cookie(&response)
}
