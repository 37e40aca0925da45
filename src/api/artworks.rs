//! Catalog routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::api::{message, ApiResult, AppState};
use crate::domain::aggregates::{Artwork, ArtworkUpdate, NewArtwork};
use crate::store::ArtworkFilter;

#[derive(Debug, Serialize)]
pub struct ArtworkResponse {
    pub message: &'static str,
    pub artwork: Artwork,
}

pub async fn list(State(s): State<AppState>, ApiQuery(filter): ApiQuery<ArtworkFilter>) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(s.catalog.list(&filter).await?))
}

pub async fn seller_listings(State(s): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Json<Vec<Artwork>>> {
    Ok(Json(s.catalog.seller_listings(&claims).await?))
}

pub async fn get(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Artwork>> {
    Ok(Json(s.catalog.get(id).await?))
}

pub async fn create(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiJson(r): ApiJson<NewArtwork>) -> ApiResult<(StatusCode, Json<ArtworkResponse>)> {
    let artwork = s.catalog.create(&claims, r).await?;
    Ok((StatusCode::CREATED, Json(ArtworkResponse { message: "Artwork created successfully", artwork })))
}

pub async fn update(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<ArtworkUpdate>) -> ApiResult<Json<ArtworkResponse>> {
    let artwork = s.catalog.update(&claims, id, r).await?;
    Ok(Json(ArtworkResponse { message: "Artwork updated successfully", artwork }))
}

pub async fn delete(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    s.catalog.delete(&claims, id).await?;
    Ok(message("Artwork deleted successfully"))
}
