//! API Error Handling
//!
//! Unified error type and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cddp_core::dto::error::ErrorBody;

use crate::service::{GalleryError, GenerationError, IngestionError};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// The backend answered, but never with valid JSON
    GenerationFailed { message: String, last_response: String },
    /// The completion backend could not be reached or refused the request
    BadGateway(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            ApiError::GenerationFailed {
                message,
                last_response,
            } => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: message,
                    last_response: Some(last_response),
                },
            ),
            ApiError::BadGateway(msg) => {
                tracing::error!("Completion backend error: {}", msg);
                (StatusCode::BAD_GATEWAY, ErrorBody::new(msg))
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(msg))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Render(e) => ApiError::BadRequest(e.to_string()),
            GenerationError::Failure {
                attempts,
                last_response,
            } => ApiError::GenerationFailed {
                message: format!("No valid JSON after {} attempts", attempts),
                last_response,
            },
            GenerationError::Backend(e) => ApiError::BadGateway(e.to_string()),
        }
    }
}

impl From<GalleryError> for ApiError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::NotFound(id) => ApiError::NotFound(format!("Pipeline {} not found", id)),
            GalleryError::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<IngestionError> for ApiError {
    fn from(err: IngestionError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
