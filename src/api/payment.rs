//! Checkout and payment confirmation routes.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use crate::api::extract::{ApiJson, AuthUser};
use crate::api::{ApiResult, AppState};
use crate::domain::aggregates::OrderView;
use crate::payment::CheckoutSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub session_id: String,
}

pub async fn create_checkout_session(State(s): State<AppState>, caller: AuthUser, ApiJson(r): ApiJson<CheckoutRequest>) -> ApiResult<Json<CheckoutSession>> {
    caller.ensure_self_or_admin(r.user_id)?;
    Ok(Json(s.checkout.start(r.user_id).await?))
}

/// Settles the caller's cart for a paid session.
pub async fn confirm(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiJson(r): ApiJson<ConfirmRequest>) -> ApiResult<Json<OrderView>> {
    Ok(Json(s.settlement.confirm(claims.sub, r.session_id.trim()).await?))
}
