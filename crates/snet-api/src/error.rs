//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps pipeline errors to HTTP status codes and JSON error bodies.
//! Internal error details are never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use snet_pipeline::PipelineError;

/// Structured JSON error response body. All error responses use this
/// format across the API surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type for Axum handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed or contains invalid values.
    /// Normalized with `Validation` to 422: the client sent
    /// syntactically valid HTTP but semantically invalid content.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Logged but not returned to clients.
    #[error("internal error: {0}")]
    Internal(String),

    /// The settlement chain or a payment rail is unreachable (502).
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl AppError {
    /// HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal/upstream error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "An upstream service error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::error!(error = %self, "upstream error"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match &err {
            PipelineError::Validation(_) => Self::Validation(err.to_string()),
            PipelineError::NotFound(_) => Self::NotFound(err.to_string()),
            PipelineError::Conflict(_) => Self::Conflict(err.to_string()),
            PipelineError::Core(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl From<snet_rails::RailError> for AppError {
    fn from(err: snet_rails::RailError) -> Self {
        use snet_rails::RailError;
        match &err {
            RailError::InvalidTarget(_) => Self::Validation(err.to_string()),
            RailError::SwapRejected(_) => Self::Conflict(err.to_string()),
            RailError::Unavailable(_) | RailError::Protocol(_) => Self::Upstream(err.to_string()),
        }
    }
}

impl From<snet_core::FeltError> for AppError {
    fn from(err: snet_core::FeltError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_and_code().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("x".into()).status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        // BadRequest normalizes with Validation to 422.
        assert_eq!(
            AppError::BadRequest("x".into()).status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_and_code().0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Upstream("x".into()).status_and_code().0,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn pipeline_errors_map_to_api_errors() {
        let e: AppError = PipelineError::NotFound("invoice x".into()).into();
        assert!(matches!(e, AppError::NotFound(_)));
        let e: AppError = PipelineError::Validation("bad".into()).into();
        assert!(matches!(e, AppError::Validation(_)));
        let e: AppError = PipelineError::Conflict("busy".into()).into();
        assert!(matches!(e, AppError::Conflict(_)));
    }
}
