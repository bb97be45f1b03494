//! DTO definitions for the saved scores (resend) routes.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{ReportStatus, ScoreReport},
    dto::format_timestamp,
    services::resend_manager::{ResendEntry, ResendSummary, ResendView},
};

/// One value inside a saved report, by catalog ids.
#[derive(Debug, Serialize, ToSchema)]
pub struct SavedScore {
    /// Catalog id of the scoring item.
    pub item_id: u32,
    /// Catalog id of the mode the value belongs to.
    pub mode_id: u32,
    /// Tally count or flag value.
    pub value: u32,
}

/// A report waiting in saved scores.
#[derive(Debug, Serialize, ToSchema)]
pub struct SavedReport {
    /// Report identifier, used to discard it.
    pub id: Uuid,
    /// Match the report scores.
    pub match_number: u32,
    /// Team the report scores.
    pub team_number: u32,
    /// RFC 3339 capture time.
    pub created_at: String,
    /// Failed delivery attempts so far.
    pub attempts: u32,
    /// Persisted status; always `pending` while saved.
    pub status: ReportStatus,
    /// Reason the last attempt failed.
    pub last_error: Option<String>,
    /// Non-zero values of the report.
    pub scores: Vec<SavedScore>,
}

impl From<ScoreReport> for SavedReport {
    fn from(report: ScoreReport) -> Self {
        Self {
            id: report.id,
            match_number: report.match_number,
            team_number: report.team_number,
            created_at: format_timestamp(report.created_at),
            attempts: report.attempts,
            status: report.status,
            last_error: report.last_error,
            scores: report
                .records
                .into_iter()
                .map(|record| SavedScore {
                    item_id: record.item_id.0,
                    mode_id: record.mode_id.0,
                    value: record.value,
                })
                .collect(),
        }
    }
}

/// What the "send saved scores" screen should show.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResendViewResponse {
    /// Nothing is saved; no submit action is offered.
    NoSavedScores {},
    /// One event's backlog, submittable in bulk.
    Backlog {
        /// Event whose backlog is shown.
        event_id: String,
        /// Saved reports, oldest first.
        reports: Vec<SavedReport>,
    },
    /// Several events have saved scores; one must be picked.
    AmbiguousEvents {
        /// Events with saved scores.
        events: Vec<String>,
    },
}

impl From<ResendView> for ResendViewResponse {
    fn from(view: ResendView) -> Self {
        match view {
            ResendView::NoSavedScores => ResendViewResponse::NoSavedScores {},
            ResendView::Backlog { event_id, reports } => ResendViewResponse::Backlog {
                event_id,
                reports: reports.into_iter().map(Into::into).collect(),
            },
            ResendView::AmbiguousEvents { events } => {
                ResendViewResponse::AmbiguousEvents { events }
            }
        }
    }
}

/// Outcome of one report in a bulk resend.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResendEntryResponse {
    /// Report the line is about.
    pub report_id: Uuid,
    /// Match the report scores.
    pub match_number: u32,
    /// Team the report scores.
    pub team_number: u32,
    /// `sent`, `failed`, or `pending` when another request was already sending it.
    pub status: ReportStatus,
    /// Attempts made so far.
    pub attempts: u32,
    /// Failure reason, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The server already has this match and team; the saved copy can be discarded.
    pub duplicate: bool,
}

impl From<ResendEntry> for ResendEntryResponse {
    fn from(entry: ResendEntry) -> Self {
        Self {
            report_id: entry.report_id,
            match_number: entry.match_number,
            team_number: entry.team_number,
            status: entry.status,
            attempts: entry.attempts,
            error: entry.error,
            duplicate: entry.duplicate,
        }
    }
}

/// Summary of a bulk resend.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResendSummaryResponse {
    /// Event that was resent, absent when nothing was saved.
    pub event_id: Option<String>,
    /// Reports delivered.
    pub sent: usize,
    /// Reports still saved after the run.
    pub failed: usize,
    /// Per-report outcomes.
    pub entries: Vec<ResendEntryResponse>,
}

impl From<ResendSummary> for ResendSummaryResponse {
    fn from(summary: ResendSummary) -> Self {
        Self {
            sent: summary.sent(),
            failed: summary.failed(),
            event_id: summary.event_id,
            entries: summary.entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_flag_reaches_the_operator() {
        let entry = ResendEntry {
            report_id: Uuid::new_v4(),
            match_number: 3,
            team_number: 254,
            status: ReportStatus::Failed,
            attempts: 2,
            error: Some("server answered 409: scores already recorded".into()),
            duplicate: true,
        };

        let json = serde_json::to_value(ResendEntryResponse::from(entry)).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["duplicate"], true);
        assert_eq!(json["attempts"], 2);
    }
}
