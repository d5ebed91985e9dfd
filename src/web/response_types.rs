//! # Web API Error Types
//!
//! Error types specific to the HTTP surface and their response conversions.
//! The service-layer taxonomy maps onto HTTP statuses here, with one JSON
//! envelope shape for every failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::services::CheckpointServiceError;

/// Web API specific errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Session authentication failed: {reason}")]
    AuthenticationError { reason: String },

    #[error("Database operation failed: {operation}")]
    DatabaseError { operation: String },

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Create a BadRequest error with a custom message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create an AuthenticationError with reason
    pub fn auth_error(reason: impl Into<String>) -> Self {
        Self::AuthenticationError {
            reason: reason.into(),
        }
    }

    /// Create a DatabaseError with operation context
    pub fn database_error(operation: impl Into<String>) -> Self {
        Self::DatabaseError {
            operation: operation.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found"),

            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required",
            ),

            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.as_str())
            }

            ApiError::AuthenticationError { reason } => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_FAILED",
                reason.as_str(),
            ),

            ApiError::DatabaseError { operation } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                operation.as_str(),
            ),

            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        };

        let error_response = json!({
            "error": {
                "code": error_code,
                "message": message
            }
        });

        (status_code, Json(error_response)).into_response()
    }
}

/// Convert service-layer errors to API errors
///
/// Store failures were already logged with their cause at the service; the
/// caller only sees the generic message.
impl From<CheckpointServiceError> for ApiError {
    fn from(err: CheckpointServiceError) -> Self {
        match err {
            CheckpointServiceError::Validation(message) => ApiError::BadRequest { message },
            CheckpointServiceError::Authentication(reason) => {
                ApiError::AuthenticationError { reason }
            }
            CheckpointServiceError::NotFound => ApiError::NotFound,
            CheckpointServiceError::Store(_) => {
                ApiError::database_error("Checkpoint store operation failed")
            }
        }
    }
}

/// Result type alias for web API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_store_errors_stay_generic() {
        // NotFound must not reveal whether the row exists for someone else
        let not_found: ApiError = CheckpointServiceError::NotFound.into();
        assert!(matches!(not_found, ApiError::NotFound));

        let store: ApiError =
            CheckpointServiceError::Store(sqlx::Error::Protocol("raw driver detail".into()))
                .into();
        match store {
            ApiError::DatabaseError { operation } => {
                assert!(!operation.contains("raw driver detail"));
            }
            other => panic!("expected DatabaseError, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_preserves_reason() {
        let err: ApiError =
            CheckpointServiceError::Validation("payload cannot be empty".to_string()).into();
        match err {
            ApiError::BadRequest { message } => assert_eq!(message, "payload cannot be empty"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }
}
