//! Community event routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use crate::api::extract::{ApiJson, ApiPath, AuthUser};
use crate::api::{message, ApiResult, AppState};
use crate::domain::aggregates::{CommunityEvent, CommunityEventUpdate, NewCommunityEvent};

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub message: &'static str,
    pub event: CommunityEvent,
}

pub async fn list(State(s): State<AppState>) -> ApiResult<Json<Vec<CommunityEvent>>> {
    Ok(Json(s.community.list().await?))
}

pub async fn get(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<CommunityEvent>> {
    Ok(Json(s.community.get(id).await?))
}

pub async fn create(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiJson(r): ApiJson<NewCommunityEvent>) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let event = s.community.create(&claims, r).await?;
    Ok((StatusCode::CREATED, Json(EventResponse { message: "Event created successfully", event })))
}

pub async fn update(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<CommunityEventUpdate>) -> ApiResult<Json<EventResponse>> {
    let event = s.community.update(&claims, id, r).await?;
    Ok(Json(EventResponse { message: "Event updated", event }))
}

pub async fn delete(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    s.community.delete(&claims, id).await?;
    Ok(message("Event deleted"))
}
