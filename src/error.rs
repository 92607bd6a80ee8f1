//! Error codes and the JSON error response.
//!
//! DESIGN
//! ======
//! Every domain error enum implements [`ErrorCode`], which gives it a
//! grepable code and a retryable flag. Route handlers convert those into
//! [`ApiError`], the single JSON error shape returned by the API:
//! `{"code": "E_...", "message": "...", "retryable": false}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON error body returned by the `/api` routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

/// An HTTP status paired with a structured error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// Build an API error from any [`ErrorCode`] value.
    pub fn new(status: StatusCode, err: &impl ErrorCode) -> Self {
        Self {
            status,
            body: ErrorBody { code: err.error_code(), message: err.to_string(), retryable: err.retryable() },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("upstream hiccup")]
    struct Flaky;

    impl ErrorCode for Flaky {
        fn error_code(&self) -> &'static str {
            "E_FLAKY"
        }

        fn retryable(&self) -> bool {
            true
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("bad input")]
    struct BadInput;

    impl ErrorCode for BadInput {
        fn error_code(&self) -> &'static str {
            "E_BAD_INPUT"
        }
    }

    #[test]
    fn api_error_carries_code_message_and_retryable() {
        let err = ApiError::new(StatusCode::BAD_GATEWAY, &Flaky);
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.body.code, "E_FLAKY");
        assert_eq!(err.body.message, "upstream hiccup");
        assert!(err.body.retryable);
    }

    #[test]
    fn retryable_defaults_to_false() {
        let err = ApiError::new(StatusCode::BAD_REQUEST, &BadInput);
        assert!(!err.body.retryable);
    }

    #[test]
    fn error_body_serializes_flat() {
        let err = ApiError::new(StatusCode::BAD_REQUEST, &BadInput);
        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json, serde_json::json!({"code": "E_BAD_INPUT", "message": "bad input", "retryable": false}));
    }

    #[test]
    fn into_response_uses_status() {
        let response = ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, &BadInput).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
