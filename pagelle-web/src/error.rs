//! Error types for pagelle-web
//!
//! Every handler error becomes `{"error": {"code", "message"}}` with a
//! matching status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Results are still locked for this voter (403)
    #[error("Results locked: {0}")]
    Locked(String),

    /// pagelle-common error; status depends on the variant
    #[error(transparent)]
    Common(#[from] pagelle_common::Error),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        use pagelle_common::Error as CommonError;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Locked(_) => (StatusCode::FORBIDDEN, "RESULTS_LOCKED"),
            ApiError::Common(CommonError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Common(CommonError::Store(_)) => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
            ApiError::Common(CommonError::Generation(_)) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR")
            }
            ApiError::Common(CommonError::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR")
            }
            ApiError::Common(CommonError::Io(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        if status.is_server_error() {
            tracing::error!(code = error_code, "Request failed: {}", self);
        }

        let message = match &self {
            ApiError::BadRequest(msg) | ApiError::Locked(msg) => msg.clone(),
            ApiError::Common(err) => err.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Unreadable JSON bodies are bad requests, whatever axum's default status
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_maps_to_bad_gateway() {
        let err = ApiError::from(pagelle_common::Error::Store("timeout".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err = ApiError::from(pagelle_common::Error::InvalidInput("blank".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_locked_maps_to_forbidden() {
        let err = ApiError::Locked("2 of 4".to_string());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
