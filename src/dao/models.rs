use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::catalog::{ItemId, ModeId};

/// One (item, mode) value carried by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Scoring item.
    pub item_id: ItemId,
    /// Mode the value was scored in.
    pub mode_id: ModeId,
    /// Tally count or flag value.
    pub value: u32,
}

/// Delivery status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Queued and waiting for a delivery attempt.
    Pending,
    /// A delivery attempt is in progress.
    Sending,
    /// The server confirmed receipt.
    Sent,
    /// The latest delivery attempt failed.
    Failed,
}

/// Immutable record of a team's scores for one match, awaiting delivery.
///
/// Only `status`, `attempts` and `last_error` change once the report exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Event the report belongs to.
    pub event_id: String,
    /// Match scouted.
    pub match_number: u32,
    /// Team scouted.
    pub team_number: u32,
    /// Non-zero values in first-click order.
    pub records: Vec<ScoreRecord>,
    /// Capture time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Failed delivery attempts so far.
    #[serde(default)]
    pub attempts: u32,
    /// Delivery status.
    pub status: ReportStatus,
    /// Reason the last attempt failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ScoreReport {
    /// Build a fresh pending report with a new identifier.
    pub fn new(
        event_id: impl Into<String>,
        match_number: u32,
        team_number: u32,
        records: Vec<ScoreRecord>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: event_id.into(),
            match_number,
            team_number,
            records,
            created_at: OffsetDateTime::now_utc(),
            attempts: 0,
            status: ReportStatus::Pending,
            last_error: None,
        }
    }
}

/// The whole persisted queue: event id to reports in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueDocument {
    events: IndexMap<String, Vec<ScoreReport>>,
}

impl QueueDocument {
    /// Append a report to the end of its event's backlog.
    pub fn push(&mut self, report: ScoreReport) {
        self.events
            .entry(report.event_id.clone())
            .or_default()
            .push(report);
    }

    /// Remove a report, dropping the event once its backlog is empty.
    pub fn remove(&mut self, event_id: &str, report_id: Uuid) -> Option<ScoreReport> {
        let reports = self.events.get_mut(event_id)?;
        let index = reports.iter().position(|report| report.id == report_id)?;
        let removed = reports.remove(index);
        if reports.is_empty() {
            self.events.shift_remove(event_id);
        }
        Some(removed)
    }

    /// Mutable access to a queued report.
    pub fn find_mut(&mut self, event_id: &str, report_id: Uuid) -> Option<&mut ScoreReport> {
        self.events
            .get_mut(event_id)?
            .iter_mut()
            .find(|report| report.id == report_id)
    }

    /// Backlog of one event, oldest first; empty for unknown events.
    pub fn reports(&self, event_id: &str) -> &[ScoreReport] {
        self.events
            .get(event_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Events with a backlog, in first-queued order.
    pub fn event_ids(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Reports across all events.
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// True when no event has a backlog.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
