//! Public user listing and search.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::UserListing;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query string for `GET /api/v1/users/search`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Matched against login id and name, case-insensitively.
    pub q: Option<String>,
}

/// List every user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = UserListing),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<UserListing>> {
    state.users.list_users().await.map(web::Json)
}

/// Search users; a blank query lists everyone.
#[utoipa::path(
    get,
    path = "/api/v1/users/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching users", body = UserListing),
        (status = 400, description = "Query too long", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "searchUsers",
    security([])
)]
#[get("/users/search")]
pub async fn search_users(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<UserListing>> {
    let listing = match params.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => state.users.search_users(term).await?,
        _ => state.users.list_users().await?,
    };
    Ok(web::Json(listing))
}
