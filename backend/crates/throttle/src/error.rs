//! Throttle Error Types
//!
//! Throttle-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! A denied attempt is a verdict, not an error, inside the throttle. Only the
//! HTTP guard turns a denial into [`ThrottleError::TooManyAttempts`]; storage
//! faults always surface as [`ThrottleError::Database`] or
//! [`ThrottleError::Internal`] so callers can tell the two apart.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type ThrottleResult<T> = Result<T, ThrottleError>;

#[derive(Debug, Error)]
pub enum ThrottleError {
    /// Rejected configuration (non-positive limits)
    #[error("Invalid throttle configuration: {0}")]
    InvalidConfig(String),

    /// Empty or oversized identity key
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// The guarded operation was refused for this window
    #[error("Too many attempts")]
    TooManyAttempts { retry_after_secs: u64 },

    #[error("State store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThrottleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThrottleError::InvalidIdentity(_) => ErrorKind::BadRequest,
            ThrottleError::TooManyAttempts { .. } => ErrorKind::TooManyRequests,
            ThrottleError::Database(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_),
            ) => ErrorKind::ServiceUnavailable,
            ThrottleError::Database(_) => ErrorKind::InternalServerError,
            ThrottleError::InvalidConfig(_) | ThrottleError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Whether this is an infrastructure fault rather than a policy decision
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, ThrottleError::Database(_) | ThrottleError::Internal(_))
    }

    fn log(&self) {
        match self {
            ThrottleError::Database(e) => {
                tracing::error!(error = %e, "Throttle state store error");
            }
            ThrottleError::Internal(msg) => {
                tracing::error!(message = %msg, "Throttle internal error");
            }
            ThrottleError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Throttle misconfigured");
            }
            ThrottleError::TooManyAttempts { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Attempt refused");
            }
            ThrottleError::InvalidIdentity(_) => {
                tracing::debug!(error = %self, "Throttle rejected identity");
            }
        }
    }
}

impl From<ThrottleError> for AppError {
    fn from(err: ThrottleError) -> Self {
        match err {
            ThrottleError::TooManyAttempts { retry_after_secs } => {
                AppError::too_many_requests("Too many attempts")
                    .with_action("Please wait before trying again")
                    .with_retry_after(retry_after_secs)
            }
            ThrottleError::InvalidIdentity(msg) => AppError::bad_request(msg),
            ThrottleError::Database(e) => AppError::from(e),
            // Details stay in the logs
            ThrottleError::InvalidConfig(_) | ThrottleError::Internal(_) => {
                AppError::internal("Attempt check failed")
            }
        }
    }
}

impl IntoResponse for ThrottleError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
