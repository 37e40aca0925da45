//! Order routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use crate::api::extract::{AdminUser, ApiJson, ApiPath, AuthUser};
use crate::api::{message, ApiResult, AppState};
use crate::domain::aggregates::{OrderLine, OrderView};
use crate::service::Revenue;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub artworks: Vec<OrderLine>,
    pub total: Decimal,
}

pub async fn create(State(s): State<AppState>, caller: AuthUser, ApiJson(r): ApiJson<CreateOrderRequest>) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    caller.ensure_self_or_admin(r.user_id)?;
    s.settlement.record(r.user_id, r.artworks, r.total).await?;
    Ok((StatusCode::CREATED, message("Order created successfully")))
}

pub async fn history(State(s): State<AppState>, caller: AuthUser, ApiPath(user_id): ApiPath<Uuid>) -> ApiResult<Json<Vec<OrderView>>> {
    caller.ensure_self_or_admin(user_id)?;
    Ok(Json(s.settlement.history(user_id).await?))
}

pub async fn revenue(State(s): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Revenue>> {
    Ok(Json(s.settlement.revenue().await?))
}
