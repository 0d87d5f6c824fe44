//! API error handling
//!
//! Every failure is rendered as `{"success": false, "error": "..."}`. The
//! status code comes from the error's `ErrorKind`, never from its message.
//! Storage and configuration failures are logged and answered with a
//! generic message so no implementation detail leaks.

use application::{ApplicationError, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned for a missing or rejected upstream key
pub const INVALID_API_KEY_MESSAGE: &str = "Invalid API key. Please check your configuration.";

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("{0}")]
    Internal(String),

    #[error("Endpoint not found")]
    EndpointNotFound,
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) | Self::EndpointNotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Failure body with the given message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => Self::BadRequest(err.to_string()),
            ErrorKind::Unauthorized => Self::Unauthorized(INVALID_API_KEY_MESSAGE.to_string()),
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::RateLimited => Self::RateLimited,
            ErrorKind::Internal => match err {
                ApplicationError::Internal(_) | ApplicationError::Configuration(_) => {
                    error!(error = %err, "Request failed");
                    Self::Internal(INTERNAL_SERVER_ERROR_MESSAGE.to_string())
                },
                upstream => Self::Internal(upstream.to_string()),
            },
        }
    }
}

/// Fallback for unknown routes
pub async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}
