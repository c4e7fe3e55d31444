use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{error, warn};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the record store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("document {} is not a valid record array: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("a record with key {0} already exists")]
    DuplicateKey(Uuid),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(id) => {
                AppError::Conflict(format!("A record with id {} already exists", id))
            }
            other => AppError::Storage(other),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {}", err))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Responding with {}: {}", status, self);
            // Storage and hashing details stay in the log.
            return HttpResponse::build(status).json(json!({"error": "Internal server error"}));
        }
        warn!("Responding with {}: {}", status, self);
        HttpResponse::build(status).json(json!({"error": self.to_string()}))
    }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_becomes_conflict() {
        let id = Uuid::new_v4();
        let err: AppError = StoreError::DuplicateKey(id).into();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains(&id.to_string())));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn io_failure_is_internal() {
        let err: AppError =
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")).into();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.to_string().contains("disk gone"));
    }

    #[test]
    fn client_errors_map_to_their_status() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
