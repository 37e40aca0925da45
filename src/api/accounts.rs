//! Registration and login routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use crate::api::extract::ApiJson;
use crate::api::{message, ApiResult, AppState};
use crate::domain::aggregates::User;
use crate::service::{LoginRequest, RegisterRequest};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

pub async fn register(State(s): State<AppState>, ApiJson(r): ApiJson<RegisterRequest>) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    s.accounts.register(r).await?;
    Ok((StatusCode::CREATED, message("User registered successfully")))
}

pub async fn login(State(s): State<AppState>, ApiJson(r): ApiJson<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let session = s.accounts.login(r).await?;
    Ok(Json(LoginResponse { message: "Login successful", token: session.token, user: session.user }))
}
