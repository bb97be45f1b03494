//! Error types for talking to the central scoring server.

use reqwest::StatusCode;
use thiserror::Error;

use crate::state::catalog::CatalogError;

/// Convenient result alias returning [`CentralError`] failures.
pub type CentralResult<T> = Result<T, CentralError>;

/// Failures of non-delivery requests (catalog fetch, lifecheck).
#[derive(Debug, Error)]
pub enum CentralError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[error("failed to send request to `{path}`")]
    RequestSend {
        /// Server path that was requested.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with an unexpected status code.
    #[error("unexpected response status {status} for `{path}`")]
    RequestStatus {
        /// Server path that was requested.
        path: String,
        /// Status the server answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode response for `{path}`")]
    DecodeResponse {
        /// Server path that was requested.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The catalog payload parsed but is inconsistent.
    #[error("invalid scoring catalog")]
    Catalog(#[from] CatalogError),
}

/// Why a single delivery attempt did not reach `Sent`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryFailure {
    /// No answer within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The server could not be reached at all.
    #[error("could not reach server: {0}")]
    Connection(String),
    /// The server answered with a non-success status.
    #[error("server answered {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        detail: String,
    },
    /// The server answered 2xx but the body was not the expected acknowledgement.
    #[error("malformed server response: {0}")]
    MalformedResponse(String),
}

impl DeliveryFailure {
    /// The server already holds scores for this team and match.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DeliveryFailure::Status { status, .. } if *status == StatusCode::CONFLICT.as_u16())
    }
}
