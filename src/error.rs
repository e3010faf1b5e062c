//! Centralized error handling module
//!
//! Unified error types and HTTP response mapping. The error surface is
//! deliberately small: mutations on the telemetry engine are total and
//! never fail, so only input validation and read-path lookups can error.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Standardized error response format
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Unique correlation ID for tracing
    pub correlation_id: String,
    /// Error type classification
    pub error_type: String,
    /// Human-readable error message (safe for clients)
    pub message: String,
    /// HTTP status code
    pub status_code: u16,
    /// Timestamp of the error
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str, status_code: StatusCode) -> Self {
        Self {
            correlation_id: Uuid::new_v4().to_string(),
            error_type: error_type.to_string(),
            message: message.to_string(),
            status_code: status_code.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_type, message) = match self {
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.as_str()),
        };

        let error_response = ErrorResponse::new(error_type, message, status);

        error!(
            correlation_id = %error_response.correlation_id,
            error_type = %error_type,
            status_code = %status.as_u16(),
            "Error response generated"
        );

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;
