//! Profile and favorites routes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use crate::api::extract::{ApiJson, ApiPath, AuthUser};
use crate::api::{message, ApiResult, AppState};
use crate::domain::aggregates::{Artwork, User};
use crate::service::{PasswordChange, Profile, ProfileUpdate};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggled {
    pub message: &'static str,
    pub is_favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct Favorites {
    pub favorites: Vec<Artwork>,
}

pub async fn me(State(s): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Json<Profile>> {
    Ok(Json(s.profiles.me(claims.sub).await?))
}

pub async fn favorites(State(s): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Json<Favorites>> {
    Ok(Json(Favorites { favorites: s.profiles.favorites(claims.sub).await? }))
}

pub async fn toggle_favorite(State(s): State<AppState>, AuthUser(claims): AuthUser, ApiPath(artwork_id): ApiPath<Uuid>) -> ApiResult<Json<FavoriteToggled>> {
    let is_favorited = s.profiles.toggle_favorite(claims.sub, artwork_id).await?;
    Ok(Json(FavoriteToggled { message: "Favorite status updated", is_favorited }))
}

/// Public view; the password hash is never serialized.
pub async fn get(State(s): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<User>> {
    Ok(Json(s.profiles.get(id).await?))
}

pub async fn update(State(s): State<AppState>, caller: AuthUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<ProfileUpdate>) -> ApiResult<Json<User>> {
    caller.ensure_self_or_admin(id)?;
    Ok(Json(s.profiles.update(id, r).await?))
}

pub async fn change_password(State(s): State<AppState>, caller: AuthUser, ApiPath(id): ApiPath<Uuid>, ApiJson(r): ApiJson<PasswordChange>) -> ApiResult<Json<serde_json::Value>> {
    caller.ensure_self_or_admin(id)?;
    s.profiles.change_password(id, r).await?;
    Ok(message("Password updated"))
}

pub async fn delete(State(s): State<AppState>, caller: AuthUser, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    caller.ensure_self_or_admin(id)?;
    s.profiles.delete(id).await?;
    Ok(message("User deleted"))
}
