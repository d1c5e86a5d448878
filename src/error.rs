//! Service and HTTP error types.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use time::Duration;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The group or member must register/join before this operation.
    #[error("not registered: {0}")]
    NotRegistered(String),
    /// The group or member already exists; nothing changed.
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    /// The member is still cooling down from the previous workout.
    #[error("workout already recorded recently, retry in {}s", .retry_after.whole_seconds())]
    RateLimited {
        /// Remaining wait.
        retry_after: Duration,
    },
    /// The update cannot be processed in this kind of chat.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The change was applied in memory but could not be saved.
    #[error("failed to persist league")]
    Persistence(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Persistence(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Caller must wait before retrying.
    #[error("too many requests: {message}")]
    TooManyRequests {
        /// Human readable explanation.
        message: String,
        /// Value of the `Retry-After` header.
        retry_after_secs: u64,
    },
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::NotRegistered(message) => AppError::NotFound(message),
            ServiceError::AlreadyRegistered(message) => AppError::Conflict(message),
            ServiceError::RateLimited { retry_after } => AppError::TooManyRequests {
                message,
                retry_after_secs: u64::try_from(retry_after.whole_seconds()).unwrap_or_default(),
            },
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Persistence(source) => AppError::ServiceUnavailable(source.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let retry_after = match &self {
            AppError::TooManyRequests {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        match retry_after {
            Some(secs) => {
                (status, [(header::RETRY_AFTER, secs.to_string())], payload).into_response()
            }
            None => (status, payload).into_response(),
        }
    }
}
