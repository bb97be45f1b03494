use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    services::resend_manager::ResendError,
    state::session::ScoringError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The saved scores file could not be read or written.
    #[error("saved scores unavailable")]
    Persistence(#[source] StorageError),
    /// The scoring catalog has not been fetched yet.
    #[error("scoring catalog not loaded yet (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Background work backing the request failed unexpectedly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Persistence(err)
    }
}

impl From<ScoringError> for ServiceError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::EmptySubmission => ServiceError::InvalidInput(err.to_string()),
            ScoringError::UnknownMode(_) | ScoringError::UnknownItem(_) => {
                ServiceError::NotFound(err.to_string())
            }
            ScoringError::NotOpen(_) | ScoringError::InvalidTransition(_) => {
                ServiceError::InvalidState(err.to_string())
            }
        }
    }
}

impl From<ResendError> for ServiceError {
    fn from(err: ResendError) -> Self {
        match err {
            ResendError::AmbiguousEvents { .. } => ServiceError::InvalidState(err.to_string()),
            ResendError::Storage(source) => ServiceError::Persistence(source),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
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
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Persistence(source) => {
                error!(error = %source, "saved scores storage failure");
                AppError::Internal(format!("saved scores unavailable: {source}"))
            }
            ServiceError::Degraded => {
                AppError::ServiceUnavailable("scoring catalog not loaded yet".into())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Internal(message) => {
                error!(%message, "request failed internally");
                AppError::Internal(message)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::state::{catalog::ItemId, session::SessionPhase};

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn scoring_errors_map_to_http_statuses() {
        assert_eq!(
            status_of(ScoringError::EmptySubmission.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ScoringError::UnknownItem(ItemId(9)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ScoringError::NotOpen(SessionPhase::Closed).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn persistence_and_degraded_statuses() {
        let storage = StorageError::unavailable("disk".into(), io::Error::other("read-only"));
        assert_eq!(
            status_of(storage.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ServiceError::Degraded),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ServiceError::Internal("task panicked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn ambiguous_events_is_a_conflict() {
        let err = ResendError::AmbiguousEvents {
            events: vec!["E1".into(), "E2".into()],
        };
        let app = AppError::from(ServiceError::from(err));
        assert!(app.to_string().contains("E1, E2"));
        assert_eq!(app.into_response().status(), StatusCode::CONFLICT);
    }
}
