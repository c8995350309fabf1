// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::services::documents::DocumentError;
use crate::services::llm::LlmError;
use crate::services::settings::SettingsError;
use crate::services::storage::StorageError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    InternalServer(String),
    ServiceUnavailable(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
    ProcessingError(String),
    StorageError(String),
    AiError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::ProcessingError(msg) => write!(f, "Processing Error: {}", msg),
            ApiError::StorageError(msg) => write!(f, "Storage Error: {}", msg),
            ApiError::AiError(msg) => write!(f, "AI Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::ProcessingError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg, "PROCESSING_ERROR")
            }
            ApiError::StorageError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg, "STORAGE_ERROR")
            }
            ApiError::AiError(msg) => (StatusCode::BAD_GATEWAY, msg, "AI_ERROR"),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::NotConfigured => {
                ApiError::ServiceUnavailable("AI service is not configured".to_string())
            }
            LlmError::RateLimitExceeded => {
                ApiError::ServiceUnavailable("AI service rate limit exceeded".to_string())
            }
            other => ApiError::AiError(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(path) => ApiError::NotFound(format!("File not found: {}", path)),
            StorageError::InvalidPath(path) => {
                ApiError::BadRequest(format!("Invalid file path: {}", path))
            }
            StorageError::TooLarge(max_bytes) => ApiError::BadRequest(format!(
                "File exceeds the {} MB upload limit",
                max_bytes / (1024 * 1024)
            )),
            other => ApiError::StorageError(other.to_string()),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::UnsupportedType(_) => ApiError::BadRequest(
                "Unsupported file type. Please upload a PDF or DOCX file.".to_string(),
            ),
            other => ApiError::ProcessingError(other.to_string()),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::DatabaseError(db) => ApiError::DatabaseError(db),
        }
    }
}
