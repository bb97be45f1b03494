use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        central::ScoreSender,
        models::{ReportStatus, ScoreReport},
        storage::StorageError,
    },
    services::submission_queue::{DeliveryResult, SubmissionQueue},
};

/// What the "send saved scores" view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendView {
    /// Nothing is queued; no submit action is offered.
    NoSavedScores,
    /// Exactly one event has a backlog; bulk submit is available.
    Backlog {
        /// Event whose backlog is shown.
        event_id: String,
        /// Queued reports, oldest first.
        reports: Vec<ScoreReport>,
    },
    /// Several events have backlogs; the operator must pick one.
    AmbiguousEvents {
        /// Events with a backlog, in first-queued order.
        events: Vec<String>,
    },
}

/// Which backlog a bulk resend should drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSelection {
    /// Use the only event with a backlog; refused when there are several.
    Automatic,
    /// The operator picked this event.
    Explicit(String),
}

/// Per-report line of the bulk resend summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendEntry {
    /// Report the line is about.
    pub report_id: Uuid,
    /// Match the report scores.
    pub match_number: u32,
    /// Team the report scores.
    pub team_number: u32,
    /// `Sent` or `Failed`; `Pending` when another caller held the report.
    pub status: ReportStatus,
    /// Attempts made so far, this one included.
    pub attempts: u32,
    /// Failure reason when the attempt did not succeed.
    pub error: Option<String>,
    /// The server already holds scores for this match and team; discarding
    /// the saved copy is safe.
    pub duplicate: bool,
}

/// Result of one bulk resend invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResendSummary {
    /// Event that was resent; `None` when nothing was queued.
    pub event_id: Option<String>,
    /// One line per attempted report, oldest first.
    pub entries: Vec<ResendEntry>,
}

impl ResendSummary {
    /// Reports delivered by this run.
    pub fn sent(&self) -> usize {
        self.count(ReportStatus::Sent)
    }

    /// Reports still queued after this run.
    pub fn failed(&self) -> usize {
        self.count(ReportStatus::Failed)
    }

    fn count(&self, status: ReportStatus) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == status)
            .count()
    }
}

/// Errors raised by resend operations.
#[derive(Debug, Error)]
pub enum ResendError {
    /// Automatic selection is impossible with more than one backlog.
    #[error("saved scores exist for several events ({}); pick one explicitly", .events.join(", "))]
    AmbiguousEvents {
        /// Events with a backlog.
        events: Vec<String>,
    },
    /// The saved scores file could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Drives operator-triggered redelivery of queued reports.
pub struct ResendManager {
    queue: Arc<SubmissionQueue>,
    sender: Arc<dyn ScoreSender>,
}

impl ResendManager {
    /// Manager resending from `queue` through `sender`.
    pub fn new(queue: Arc<SubmissionQueue>, sender: Arc<dyn ScoreSender>) -> Self {
        Self { queue, sender }
    }

    /// Load the queue and decide what to present.
    pub async fn activate(&self) -> Result<ResendView, ResendError> {
        let events = self.queue.known_events().await?;
        match events.len() {
            0 => Ok(ResendView::NoSavedScores),
            1 => self.select_event(&events[0]).await,
            _ => Ok(ResendView::AmbiguousEvents { events }),
        }
    }

    /// Show the backlog of an operator-chosen event.
    pub async fn select_event(&self, event_id: &str) -> Result<ResendView, ResendError> {
        let reports = self.queue.list(event_id).await?;
        if reports.is_empty() {
            return Ok(ResendView::NoSavedScores);
        }
        Ok(ResendView::Backlog {
            event_id: event_id.to_string(),
            reports,
        })
    }

    /// Attempt every queued report of the selected event once, oldest first.
    ///
    /// Failures do not stop the run; storage errors do.
    pub async fn bulk_submit(&self, selection: EventSelection) -> Result<ResendSummary, ResendError> {
        let event_id = match selection {
            EventSelection::Explicit(event_id) => event_id,
            EventSelection::Automatic => {
                let mut events = self.queue.known_events().await?;
                match events.len() {
                    0 => return Ok(ResendSummary::default()),
                    1 => events.remove(0),
                    _ => return Err(ResendError::AmbiguousEvents { events }),
                }
            }
        };

        let backlog = self.queue.list(&event_id).await?;
        info!(event_id = %event_id, reports = backlog.len(), "resending saved scores");

        let mut entries = Vec::with_capacity(backlog.len());
        for report in backlog {
            let result = self.queue.deliver(self.sender.as_ref(), &report).await?;
            let mut duplicate = false;
            let (status, attempts, error) = match result {
                DeliveryResult::Sent => (ReportStatus::Sent, report.attempts + 1, None),
                DeliveryResult::Failed { failure, attempts } => {
                    duplicate = failure.is_duplicate();
                    (ReportStatus::Failed, attempts, Some(failure.to_string()))
                }
                DeliveryResult::InFlight => (ReportStatus::Pending, report.attempts, None),
            };
            entries.push(ResendEntry {
                report_id: report.id,
                match_number: report.match_number,
                team_number: report.team_number,
                status,
                attempts,
                error,
                duplicate,
            });
        }

        let summary = ResendSummary {
            event_id: Some(event_id),
            entries,
        };
        info!(
            sent = summary.sent(),
            failed = summary.failed(),
            "resend finished"
        );
        Ok(summary)
    }

    /// Drop a report the operator no longer wants delivered.
    pub async fn discard(&self, event_id: &str, report_id: Uuid) -> Result<bool, ResendError> {
        let removed = self.queue.dequeue(event_id, report_id).await?;
        if removed {
            info!(event_id = %event_id, report_id = %report_id, "saved score discarded by operator");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::{
            central::{DeliveryFailure, DeliveryOutcome},
            models::ScoreRecord,
        },
        services::submission_queue::testing::{MemoryQueueStore, ScriptedSender},
        state::catalog::{ItemId, ModeId},
    };

    fn report(event: &str, match_number: u32) -> ScoreReport {
        ScoreReport::new(
            event,
            match_number,
            1678,
            vec![ScoreRecord {
                item_id: ItemId(2),
                mode_id: ModeId(1),
                value: 4,
            }],
        )
    }

    fn manager(
        outcomes: impl IntoIterator<Item = DeliveryOutcome>,
    ) -> (Arc<SubmissionQueue>, Arc<ScriptedSender>, ResendManager) {
        let queue = Arc::new(SubmissionQueue::new(Arc::new(MemoryQueueStore::default())));
        let sender = Arc::new(ScriptedSender::new(outcomes));
        let manager = ResendManager::new(queue.clone(), sender.clone());
        (queue, sender, manager)
    }

    #[tokio::test]
    async fn empty_queue_reports_no_saved_scores() {
        let (_, sender, manager) = manager(Vec::<DeliveryOutcome>::new());

        assert_eq!(manager.activate().await.unwrap(), ResendView::NoSavedScores);
        let summary = manager.bulk_submit(EventSelection::Automatic).await.unwrap();
        assert!(summary.entries.is_empty());
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_event_backlog_is_shown() {
        let (queue, _, manager) = manager(Vec::<DeliveryOutcome>::new());
        let first = report("E1", 1);
        queue.enqueue(first.clone()).await.unwrap();

        assert_eq!(
            manager.activate().await.unwrap(),
            ResendView::Backlog {
                event_id: "E1".into(),
                reports: vec![first]
            }
        );
    }

    #[tokio::test]
    async fn partial_failure_keeps_only_failed_report() {
        let (queue, sender, manager) = manager([
            DeliveryOutcome::Sent,
            DeliveryOutcome::Failed(DeliveryFailure::Connection("refused".into())),
        ]);
        let a = report("E1", 1);
        let b = report("E1", 2);
        queue.enqueue(a.clone()).await.unwrap();
        queue.enqueue(b.clone()).await.unwrap();

        let summary = manager.bulk_submit(EventSelection::Automatic).await.unwrap();

        assert_eq!(*sender.sent.lock().unwrap(), vec![a.id, b.id]);
        assert_eq!(summary.sent(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.entries[1].report_id, b.id);
        assert_eq!(summary.entries[1].attempts, 1);

        let remaining = queue.list("E1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
        assert_eq!(remaining[0].attempts, b.attempts + 1);
    }

    #[tokio::test]
    async fn failures_do_not_abort_the_run() {
        let (queue, sender, manager) = manager([
            DeliveryOutcome::Failed(DeliveryFailure::Timeout),
            DeliveryOutcome::Failed(DeliveryFailure::Timeout),
            DeliveryOutcome::Sent,
        ]);
        for match_number in 1..=3 {
            queue.enqueue(report("E1", match_number)).await.unwrap();
        }

        let summary = manager.bulk_submit(EventSelection::Automatic).await.unwrap();

        assert_eq!(sender.sent.lock().unwrap().len(), 3);
        assert_eq!(summary.failed(), 2);
        assert_eq!(queue.list("E1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn several_events_require_explicit_selection() {
        let (queue, sender, manager) = manager([DeliveryOutcome::Sent]);
        queue.enqueue(report("E1", 1)).await.unwrap();
        queue.enqueue(report("E2", 1)).await.unwrap();

        assert_eq!(
            manager.activate().await.unwrap(),
            ResendView::AmbiguousEvents {
                events: vec!["E1".into(), "E2".into()]
            }
        );
        let err = manager
            .bulk_submit(EventSelection::Automatic)
            .await
            .unwrap_err();
        assert!(matches!(err, ResendError::AmbiguousEvents { .. }));
        assert!(sender.sent.lock().unwrap().is_empty());

        let summary = manager
            .bulk_submit(EventSelection::Explicit("E2".into()))
            .await
            .unwrap();
        assert_eq!(summary.sent(), 1);
        assert_eq!(queue.known_events().await.unwrap(), vec!["E1"]);
    }

    #[tokio::test]
    async fn already_submitted_report_is_flagged_for_discard() {
        let (queue, _, manager) = manager([
            DeliveryOutcome::Failed(DeliveryFailure::Status {
                status: 409,
                detail: "scores already recorded".into(),
            }),
            DeliveryOutcome::Failed(DeliveryFailure::Timeout),
        ]);
        let stale = report("E1", 1);
        queue.enqueue(stale.clone()).await.unwrap();
        queue.enqueue(report("E1", 2)).await.unwrap();

        let summary = manager.bulk_submit(EventSelection::Automatic).await.unwrap();

        assert_eq!(summary.failed(), 2);
        assert!(summary.entries[0].duplicate);
        assert!(!summary.entries[1].duplicate);
        assert!(manager.discard("E1", stale.id).await.unwrap());
        assert_eq!(queue.list("E1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn discard_removes_report() {
        let (queue, _, manager) = manager(Vec::<DeliveryOutcome>::new());
        let queued = report("E1", 1);
        queue.enqueue(queued.clone()).await.unwrap();

        assert!(manager.discard("E1", queued.id).await.unwrap());
        assert!(!manager.discard("E1", queued.id).await.unwrap());
        assert_eq!(manager.activate().await.unwrap(), ResendView::NoSavedScores);
    }
}
