use std::{
    collections::HashSet,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dao::{
    central::{DeliveryFailure, DeliveryOutcome, ScoreSender},
    models::{ReportStatus, ScoreReport},
    queue_store::QueueStore,
    storage::StorageResult,
};

/// What happened when the queue tried to deliver one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// Delivered and removed from the queue.
    Sent,
    /// Still queued; `attempts` now holds the updated count.
    Failed {
        /// Why the attempt failed.
        failure: DeliveryFailure,
        /// Failed attempts recorded against the report so far.
        attempts: u32,
    },
    /// Another caller is already sending this report.
    InFlight,
}

/// Durable per-event FIFO of undelivered reports.
///
/// Every mutation is a whole-document read-modify-write performed under one lock.
pub struct SubmissionQueue {
    store: Arc<dyn QueueStore>,
    write_gate: Mutex<()>,
    in_flight: StdMutex<HashSet<Uuid>>,
}

/// Marks a report as being delivered until dropped, even when the delivering
/// future is cancelled mid-attempt.
struct InFlightGuard<'a> {
    reports: &'a StdMutex<HashSet<Uuid>>,
    id: Uuid,
}

impl<'a> InFlightGuard<'a> {
    /// `None` when the report is already claimed by another caller.
    fn claim(reports: &'a StdMutex<HashSet<Uuid>>, id: Uuid) -> Option<Self> {
        let inserted = reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        inserted.then_some(Self { reports, id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl SubmissionQueue {
    /// Queue persisted through `store`.
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
            in_flight: StdMutex::new(HashSet::new()),
        }
    }

    /// Append a report to its event's backlog and persist; returns the report id.
    pub async fn enqueue(&self, report: ScoreReport) -> StorageResult<Uuid> {
        let _gate = self.write_gate.lock().await;
        let mut document = self.store.load().await?;
        let id = report.id;
        let event_id = report.event_id.clone();
        document.push(report);
        self.store.save(document).await?;
        info!(report_id = %id, event_id = %event_id, "score report queued");
        Ok(id)
    }

    /// Remove a report. Removing an absent report is a no-op returning `false`.
    pub async fn dequeue(&self, event_id: &str, report_id: Uuid) -> StorageResult<bool> {
        let _gate = self.write_gate.lock().await;
        let mut document = self.store.load().await?;
        if document.remove(event_id, report_id).is_none() {
            return Ok(false);
        }
        self.store.save(document).await?;
        Ok(true)
    }

    /// Count a failed attempt against a queued report.
    pub async fn record_failure(
        &self,
        event_id: &str,
        report_id: Uuid,
        failure: &DeliveryFailure,
    ) -> StorageResult<Option<u32>> {
        let _gate = self.write_gate.lock().await;
        let mut document = self.store.load().await?;
        let Some(report) = document.find_mut(event_id, report_id) else {
            return Ok(None);
        };
        report.attempts += 1;
        report.status = ReportStatus::Pending;
        report.last_error = Some(failure.to_string());
        let attempts = report.attempts;
        self.store.save(document).await?;
        Ok(Some(attempts))
    }

    /// Pending reports for one event, oldest first.
    pub async fn list(&self, event_id: &str) -> StorageResult<Vec<ScoreReport>> {
        let document = self.store.load().await?;
        Ok(document.reports(event_id).to_vec())
    }

    /// Events that currently have a backlog, in first-queued order.
    pub async fn known_events(&self) -> StorageResult<Vec<String>> {
        let document = self.store.load().await?;
        Ok(document.event_ids().map(str::to_owned).collect())
    }

    /// Reports waiting across all events.
    pub async fn pending_count(&self) -> StorageResult<usize> {
        Ok(self.store.load().await?.len())
    }

    /// Make one delivery attempt for a queued report and settle the queue accordingly.
    ///
    /// The report must already be persisted. Storage failures after the attempt
    /// are returned, never swallowed.
    pub async fn deliver(
        &self,
        sender: &dyn ScoreSender,
        report: &ScoreReport,
    ) -> StorageResult<DeliveryResult> {
        let Some(_claim) = InFlightGuard::claim(&self.in_flight, report.id) else {
            warn!(report_id = %report.id, "report already being delivered; skipping");
            return Ok(DeliveryResult::InFlight);
        };

        let outcome = sender.attempt_send(report).await;
        self.settle(report, outcome).await
    }

    async fn settle(
        &self,
        report: &ScoreReport,
        outcome: DeliveryOutcome,
    ) -> StorageResult<DeliveryResult> {
        match outcome {
            DeliveryOutcome::Sent => {
                self.dequeue(&report.event_id, report.id)
                    .await
                    .inspect_err(|err| {
                        error!(
                            report_id = %report.id,
                            error = %err,
                            "report delivered but could not be removed from saved scores"
                        )
                    })?;
                info!(
                    report_id = %report.id,
                    match_number = report.match_number,
                    team_number = report.team_number,
                    "score report delivered"
                );
                Ok(DeliveryResult::Sent)
            }
            DeliveryOutcome::Failed(failure) => {
                warn!(
                    report_id = %report.id,
                    error = %failure,
                    "score report delivery failed; keeping it queued"
                );
                let attempts = self
                    .record_failure(&report.event_id, report.id, &failure)
                    .await
                    .inspect_err(|err| {
                        error!(report_id = %report.id, error = %err, "failed to record delivery failure")
                    })?
                    .unwrap_or(report.attempts + 1);
                Ok(DeliveryResult::Failed { failure, attempts })
            }
        }
    }
}
