mod client;
mod config;
mod error;

use futures::future::BoxFuture;

use crate::dao::models::ScoreReport;

pub use client::SubmissionClient;
pub use config::CentralConfig;
pub use error::{CentralError, CentralResult, DeliveryFailure};

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The server confirmed receipt.
    Sent,
    /// The attempt failed; the report must stay queued.
    Failed(DeliveryFailure),
}

/// Sends one report to the central server, exactly one attempt per call.
///
/// Retry policy belongs to the caller.
pub trait ScoreSender: Send + Sync {
    /// Make one delivery attempt; failures are reported in the outcome, never raised.
    fn attempt_send(&self, report: &ScoreReport) -> BoxFuture<'static, DeliveryOutcome>;

    /// Whether the server currently answers at all.
    fn health_check(&self) -> BoxFuture<'static, bool>;
}
