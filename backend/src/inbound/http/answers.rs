//! Answer handlers, nested under their question.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Answer, AnswerContent, AnswerId, AnswerView, Error, QuestionId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::questions::VoteRequest;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::content_validation_error;

/// Body for creating or editing an answer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AnswerRequest {
    pub content: String,
}

fn ids(path: web::Path<(i32, i32)>) -> (QuestionId, AnswerId) {
    let (question, answer) = path.into_inner();
    (QuestionId::new(question), AnswerId::new(answer))
}

/// Answers to a question, best voted first.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/answers",
    params(("id" = i32, Path, description = "Question id")),
    responses(
        (status = 200, description = "Answers", body = [AnswerView]),
        (status = 404, description = "Unknown question", body = Error)
    ),
    tags = ["answers"],
    operation_id = "listAnswers",
    security([])
)]
#[get("/questions/{id}/answers")]
pub async fn list_answers(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<AnswerView>>> {
    let question = QuestionId::new(path.into_inner());
    state.answers.list(question).await.map(web::Json)
}

/// Answer a question as the logged-in member.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/answers",
    params(("id" = i32, Path, description = "Question id")),
    request_body = AnswerRequest,
    responses(
        (status = 201, description = "Answer created", body = Answer),
        (status = 400, description = "Empty content", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown question", body = Error)
    ),
    tags = ["answers"],
    operation_id = "createAnswer"
)]
#[post("/questions/{id}/answers")]
pub async fn create_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<AnswerRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let content =
        AnswerContent::new(&payload.content).map_err(|err| content_validation_error(&err))?;
    let question = QuestionId::new(path.into_inner());
    let answer = state.answers.create(question, author, content).await?;
    Ok(HttpResponse::Created().json(answer))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/answers/{answer_id}",
    params(
        ("id" = i32, Path, description = "Question id"),
        ("answer_id" = i32, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Answer", body = Answer),
        (status = 404, description = "Unknown answer", body = Error)
    ),
    tags = ["answers"],
    operation_id = "getAnswer",
    security([])
)]
#[get("/questions/{id}/answers/{answer_id}")]
pub async fn get_answer(
    state: web::Data<HttpState>,
    path: web::Path<(i32, i32)>,
) -> ApiResult<web::Json<Answer>> {
    let (question, answer) = ids(path);
    state.answers.get(question, answer).await.map(web::Json)
}

/// Edit an answer. Only its author may do this.
#[utoipa::path(
    patch,
    path = "/api/v1/questions/{id}/answers/{answer_id}",
    params(
        ("id" = i32, Path, description = "Question id"),
        ("answer_id" = i32, Path, description = "Answer id")
    ),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Updated answer", body = Answer),
        (status = 400, description = "Empty content", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown answer", body = Error)
    ),
    tags = ["answers"],
    operation_id = "updateAnswer"
)]
#[patch("/questions/{id}/answers/{answer_id}")]
pub async fn update_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
    payload: web::Json<AnswerRequest>,
) -> ApiResult<web::Json<Answer>> {
    let actor = session.require_user_id()?;
    let content =
        AnswerContent::new(&payload.content).map_err(|err| content_validation_error(&err))?;
    let (question, answer) = ids(path);
    state
        .answers
        .update(question, answer, actor, content)
        .await
        .map(web::Json)
}

/// Delete an answer. Only its author may do this.
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}/answers/{answer_id}",
    params(
        ("id" = i32, Path, description = "Question id"),
        ("answer_id" = i32, Path, description = "Answer id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown answer", body = Error)
    ),
    tags = ["answers"],
    operation_id = "deleteAnswer"
)]
#[delete("/questions/{id}/answers/{answer_id}")]
pub async fn delete_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let (question, answer) = ids(path);
    state.answers.delete(question, answer, actor).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/answers/{answer_id}/vote",
    params(
        ("id" = i32, Path, description = "Question id"),
        ("answer_id" = i32, Path, description = "Answer id")
    ),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Answer with new tally", body = Answer),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown answer", body = Error)
    ),
    tags = ["answers"],
    operation_id = "voteAnswer"
)]
#[post("/questions/{id}/answers/{answer_id}/vote")]
pub async fn vote_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<web::Json<Answer>> {
    session.require_user_id()?;
    let (question, answer) = ids(path);
    state
        .answers
        .vote(question, answer, payload.direction)
        .await
        .map(web::Json)
}

/// Mark an answer as accepted; any previously accepted answer is cleared.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/answers/{answer_id}/accept",
    params(
        ("id" = i32, Path, description = "Question id"),
        ("answer_id" = i32, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Accepted answer", body = Answer),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the question author", body = Error),
        (status = 404, description = "Unknown answer", body = Error)
    ),
    tags = ["answers"],
    operation_id = "acceptAnswer"
)]
#[post("/questions/{id}/answers/{answer_id}/accept")]
pub async fn accept_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
) -> ApiResult<web::Json<Answer>> {
    let actor = session.require_user_id()?;
    let (question, answer) = ids(path);
    state
        .answers
        .accept(question, answer, actor)
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use serde_json::{Value, json};

    use crate::domain::{AuthorProfile, UserId, VoteDirection};
    use crate::inbound::http::test_utils::{MockPorts, api_test_app, sign_in};

    fn answer(id: i32, question: i32, author: i32) -> Answer {
        let at = Utc
            .with_ymd_and_hms(2025, 8, 2, 10, 0, 0)
            .single()
            .expect("valid time");
        Answer {
            id: AnswerId::new(id),
            content: "Use an explicit lifetime parameter.".to_owned(),
            votes: 0,
            accepted: false,
            question_id: QuestionId::new(question),
            author_id: UserId::new(author),
            created_at: at,
            updated_at: at,
        }
    }

    #[actix_web::test]
    async fn listing_is_public_and_flattens_answers() {
        let mut ports = MockPorts::default();
        ports
            .answers
            .expect_list()
            .with(eq(QuestionId::new(2)))
            .times(1)
            .return_once(|_| {
                Ok(vec![AnswerView {
                    answer: answer(8, 2, 3),
                    author: AuthorProfile::from_parts(Some("Kim".to_owned()), None, Some(12)),
                }])
            });
        let app = actix_test::init_service(api_test_app(ports)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/questions/2/answers")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body[0]["id"], 8);
        assert_eq!(body[0]["author"]["name"], "Kim");
        assert_eq!(body[0]["author"]["image"], "/placeholder-user.jpg");
    }

    #[actix_web::test]
    async fn blank_answer_is_rejected() {
        let app = actix_test::init_service(api_test_app(MockPorts::default())).await;
        let cookie = sign_in(&app, 3).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/questions/2/answers")
            .cookie(cookie)
            .set_json(json!({"content": "   "}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], "empty_content");
    }

    #[actix_web::test]
    async fn answering_sanitises_content() {
        let mut ports = MockPorts::default();
        ports
            .answers
            .expect_create()
            .withf(|question, author, content| {
                *question == QuestionId::new(2)
                    && *author == UserId::new(3)
                    && !content.as_str().contains("onclick")
            })
            .times(1)
            .return_once(|_, _, _| Ok(answer(8, 2, 3)));
        let app = actix_test::init_service(api_test_app(ports)).await;
        let cookie = sign_in(&app, 3).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/questions/2/answers")
            .cookie(cookie)
            .set_json(json!({"content": "<a onclick=\"x()\">see docs</a>"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn answer_from_another_question_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .answers
            .expect_get()
            .with(eq(QuestionId::new(2)), eq(AnswerId::new(99)))
            .return_once(|_, _| Err(Error::not_found("answer 99 not found")));
        let app = actix_test::init_service(api_test_app(ports)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/questions/2/answers/99")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn accept_passes_session_user_as_actor() {
        let mut ports = MockPorts::default();
        ports
            .answers
            .expect_accept()
            .with(
                eq(QuestionId::new(2)),
                eq(AnswerId::new(8)),
                eq(UserId::new(1)),
            )
            .times(1)
            .return_once(|_, _, _| {
                let mut accepted = answer(8, 2, 3);
                accepted.accepted = true;
                Ok(accepted)
            });
        let app = actix_test::init_service(api_test_app(ports)).await;
        let cookie = sign_in(&app, 1).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/questions/2/answers/8/accept")
            .cookie(cookie)
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["accepted"], true);
    }

    #[actix_web::test]
    async fn non_owner_cannot_accept() {
        let mut ports = MockPorts::default();
        ports
            .answers
            .expect_accept()
            .return_once(|_, _, _| Err(Error::forbidden("only the question author may accept")));
        let app = actix_test::init_service(api_test_app(ports)).await;
        let cookie = sign_in(&app, 4).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/questions/2/answers/8/accept")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn vote_and_delete_require_a_session() {
        let app = actix_test::init_service(api_test_app(MockPorts::default())).await;

        let vote = actix_test::TestRequest::post()
            .uri("/api/v1/questions/2/answers/8/vote")
            .set_json(json!({"direction": "up"}))
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, vote).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let delete = actix_test::TestRequest::delete()
            .uri("/api/v1/questions/2/answers/8")
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, delete).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn vote_forwards_direction() {
        let mut ports = MockPorts::default();
        ports
            .answers
            .expect_vote()
            .with(
                eq(QuestionId::new(2)),
                eq(AnswerId::new(8)),
                eq(VoteDirection::Down),
            )
            .times(1)
            .return_once(|_, _, _| {
                let mut voted = answer(8, 2, 3);
                voted.votes = -1;
                Ok(voted)
            });
        let app = actix_test::init_service(api_test_app(ports)).await;
        let cookie = sign_in(&app, 6).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/questions/2/answers/8/vote")
            .cookie(cookie)
            .set_json(json!({"direction": "down"}))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["votes"], -1);
    }
}
