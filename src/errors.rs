use crate::services::ServiceError;
use crate::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        use ServiceError::*;
        let status = match &err {
            Unauthorized => StatusCode::UNAUTHORIZED,
            AccessDenied => StatusCode::FORBIDDEN,
            BucketNotFound(_) | FileNotFound(_) => StatusCode::NOT_FOUND,
            DuplicateName(_) | DuplicateEmail(_) | BucketNotEmpty => StatusCode::CONFLICT,
            Validation(ValidationError::FileTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Validation(_) | InvalidLimit | LimitBelowUsage { .. } | QuotaExceeded { .. } => {
                StatusCode::BAD_REQUEST
            }
            StorageWrite(_) | StorageMove(_) | StorageInconsistency { .. }
            | MetadataCommit(_) | Sqlx(_) | Blob(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError::new(status, err.to_string())
    }
}
