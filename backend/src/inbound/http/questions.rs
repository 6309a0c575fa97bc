//! Question handlers.
//!
//! Reads are public; posting, editing, deleting and voting require a session.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, Question, QuestionDetail, QuestionDraft, QuestionId, QuestionListing, QuestionPatch,
    VoteDirection,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::content_validation_error;

/// Body for `POST /api/v1/questions`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateQuestionRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body for `PATCH /api/v1/questions/{id}`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body for the vote endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

/// List questions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/questions",
    responses(
        (status = 200, description = "Questions", body = [QuestionListing]),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["questions"],
    operation_id = "listQuestions",
    security([])
)]
#[get("/questions")]
pub async fn list_questions(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<QuestionListing>>> {
    state.questions.list().await.map(web::Json)
}

/// Post a question as the logged-in member.
#[utoipa::path(
    post,
    path = "/api/v1/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 400, description = "Invalid content", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["questions"],
    operation_id = "createQuestion"
)]
#[post("/questions")]
pub async fn create_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateQuestionRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let CreateQuestionRequest {
        title,
        description,
        tags,
    } = payload.into_inner();
    let draft = QuestionDraft::new(&title, &description, tags)
        .map_err(|err| content_validation_error(&err))?;
    let question = state.questions.create(author, draft).await?;
    Ok(HttpResponse::Created().json(question))
}

/// Question page with author and answers. Each call counts as a view.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}",
    params(("id" = i32, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question", body = QuestionDetail),
        (status = 404, description = "Unknown question", body = Error)
    ),
    tags = ["questions"],
    operation_id = "getQuestion",
    security([])
)]
#[get("/questions/{id}")]
pub async fn get_question(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<QuestionDetail>> {
    let id = QuestionId::new(path.into_inner());
    state.questions.get(id).await.map(web::Json)
}

/// Edit a question. Only its author may do this.
#[utoipa::path(
    patch,
    path = "/api/v1/questions/{id}",
    params(("id" = i32, Path, description = "Question id")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Updated question", body = Question),
        (status = 400, description = "Invalid content", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown question", body = Error)
    ),
    tags = ["questions"],
    operation_id = "updateQuestion"
)]
#[patch("/questions/{id}")]
pub async fn update_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<UpdateQuestionRequest>,
) -> ApiResult<web::Json<Question>> {
    let actor = session.require_user_id()?;
    let UpdateQuestionRequest {
        title,
        description,
        tags,
    } = payload.into_inner();
    let patch = QuestionPatch::new(title.as_deref(), description.as_deref(), tags)
        .map_err(|err| content_validation_error(&err))?;
    let id = QuestionId::new(path.into_inner());
    state.questions.update(id, actor, patch).await.map(web::Json)
}

/// Delete a question and its answers. Only its author may do this.
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    params(("id" = i32, Path, description = "Question id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown question", body = Error)
    ),
    tags = ["questions"],
    operation_id = "deleteQuestion"
)]
#[delete("/questions/{id}")]
pub async fn delete_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state
        .questions
        .delete(QuestionId::new(path.into_inner()), actor)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Vote a question up or down.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/vote",
    params(("id" = i32, Path, description = "Question id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Question with new tally", body = Question),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown question", body = Error)
    ),
    tags = ["questions"],
    operation_id = "voteQuestion"
)]
#[post("/questions/{id}/vote")]
pub async fn vote_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<web::Json<Question>> {
    session.require_user_id()?;
    let id = QuestionId::new(path.into_inner());
    state
        .questions
        .vote(id, payload.direction)
        .await
        .map(web::Json)
}
