//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::{ExtractionError, LlmError};
use crate::session::SessionError;
use crate::store::StoreError;
use crate::view::ViewError;

/// Structured error response body for the browser client.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unknown or expired session")]
    SessionNotFound,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,
    #[error("Model endpoint unavailable: {0}")]
    LlmUnavailable(String),
    #[error("Model endpoint rejected the request (status {0})")]
    LlmRejected(u16),
    #[error("No regimen data found in the model response")]
    ExtractionEmpty,
    #[error("Extracted data does not fit the regimen shape: {0}")]
    ExtractionInvalid(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Unknown or expired session".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION",
                detail.clone(),
            ),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Upload exceeds the size limit".to_string(),
            ),
            ApiError::LlmUnavailable(detail) => (
                StatusCode::BAD_GATEWAY,
                "LLM_UNAVAILABLE",
                detail.clone(),
            ),
            ApiError::LlmRejected(status) => (
                StatusCode::BAD_GATEWAY,
                "LLM_REJECTED",
                format!("Model endpoint rejected the request (status {status})"),
            ),
            ApiError::ExtractionEmpty => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_EMPTY",
                "No regimen data found in the model response".to_string(),
            ),
            ApiError::ExtractionInvalid(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_INVALID",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => ApiError::SessionNotFound,
            SessionError::LockPoisoned => ApiError::Internal("session table lock poisoned".into()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::ExtractionInvalid(err.to_string())
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Rejected { status, .. } => ApiError::LlmRejected(status),
            other => ApiError::LlmUnavailable(other.to_string()),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
