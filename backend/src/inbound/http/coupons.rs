//! Coupon wallet handlers. Every route requires a session.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Coupon, CouponCode, Error, Redemption};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::coupon_code_error;

/// Body for `POST /api/v1/coupons/redeem`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub coupon_code: String,
}

/// Point balance of the logged-in member.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PointsResponse {
    pub points: i32,
}

/// Coupons that can still be redeemed.
#[utoipa::path(
    get,
    path = "/api/v1/coupons",
    responses(
        (status = 200, description = "Unused coupons", body = [Coupon]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "listCoupons"
)]
#[get("/coupons")]
pub async fn list_coupons(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Coupon>>> {
    session.require_user_id()?;
    state.coupons.available().await.map(web::Json)
}

/// Redeem a coupon for points.
#[utoipa::path(
    post,
    path = "/api/v1/coupons/redeem",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Coupon redeemed", body = Redemption),
        (status = 400, description = "Invalid coupon code", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown coupon", body = Error),
        (status = 409, description = "Coupon already used", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "redeemCoupon"
)]
#[post("/coupons/redeem")]
pub async fn redeem_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RedeemRequest>,
) -> ApiResult<web::Json<Redemption>> {
    let user = session.require_user_id()?;
    let code = CouponCode::new(&payload.coupon_code).map_err(|err| coupon_code_error(&err))?;
    state.coupons.redeem(&code, user).await.map(web::Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/coupons/points",
    responses(
        (status = 200, description = "Point balance", body = PointsResponse),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "currentPoints"
)]
#[get("/coupons/points")]
pub async fn current_points(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PointsResponse>> {
    let user = session.require_user_id()?;
    let points = state.coupons.points(user).await?;
    Ok(web::Json(PointsResponse { points }))
}
