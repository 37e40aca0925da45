//! HTTP error responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::fmt;
use crate::{ErrorKind, MarketError};

/// Error returned by every handler. Serialized as `{code, message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    /// Logged for server errors, never sent to the client.
    source: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), source: None }
    }

    pub fn with_source(mut self, source: impl fmt::Display) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message) }
    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message) }
    pub fn forbidden(message: impl Into<String>) -> Self { Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message) }
    pub fn bad_gateway(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_GATEWAY, "PAYMENT_PROVIDER_ERROR", message) }
    pub fn internal(message: impl Into<String>) -> Self { Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", message) }

    pub fn status(&self) -> StatusCode { self.status }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "[{}] {}", self.code, self.message) }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = self.code,
                message = %self.message,
                error = self.source.as_deref().unwrap_or(""),
                "Request failed"
            );
        }
        let body = ErrorBody { code: self.code, message: &self.message };
        (self.status, Json(body)).into_response()
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::not_found(err.to_string()),
            ErrorKind::Validation => Self::bad_request(err.to_string()),
            ErrorKind::Unauthorized => Self::unauthorized(err.to_string()),
            ErrorKind::Forbidden => Self::forbidden(err.to_string()),
            ErrorKind::Upstream => Self::bad_gateway("Payment provider unavailable").with_source(err),
            ErrorKind::Internal => Self::internal("An internal error occurred").with_source(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (MarketError::CartNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (MarketError::EmptyCart, StatusCode::BAD_REQUEST),
            (MarketError::UserExists, StatusCode::BAD_REQUEST),
            (MarketError::Unauthorized("no token".into()), StatusCode::UNAUTHORIZED),
            (MarketError::Forbidden("not yours".into()), StatusCode::FORBIDDEN),
            (MarketError::PaymentProvider("timeout".into()), StatusCode::BAD_GATEWAY),
            (MarketError::StorageError("pool closed".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::from(MarketError::StorageError("password=hunter2".into()));
        assert_eq!(err.to_string(), "[INTERNAL_SERVER_ERROR] An internal error occurred");
        assert_eq!(err.source.as_deref(), Some("Storage error: password=hunter2"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::from(MarketError::ItemNotInCart(Uuid::nil()));
        assert_eq!(err.to_string(), "[NOT_FOUND] Item not found in cart");
    }
}
