//! Request extractors.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::async_trait;
use uuid::Uuid;
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::auth::Claims;

/// JSON body whose rejections render as [`ApiError`].
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections render as [`ApiError`].
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejections render as [`ApiError`].
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Token from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'"))?
            .trim();
        if token.is_empty() { return Err(ApiError::unauthorized("Empty bearer token")); }
        Ok(Self(token.to_string()))
    }
}

/// Caller authenticated by a valid session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let claims = state.tokens.verify(&token)?;
        Ok(Self(claims))
    }
}

impl AuthUser {
    /// Callers may act on their own resources; admins on anyone's.
    pub fn ensure_self_or_admin(&self, user_id: Uuid) -> Result<(), ApiError> {
        if self.0.sub == user_id || self.0.is_admin() { return Ok(()); }
        tracing::warn!(caller = %self.0.sub, target = %user_id, "Cross-user access denied");
        Err(ApiError::forbidden("Not allowed to access another user's resources"))
    }
}

/// Caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() { return Err(ApiError::forbidden("Admin access required")); }
        Ok(Self(claims))
    }
}
