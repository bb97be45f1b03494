//! DTO definitions for the scoring session routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_timestamp, phase::VisibleSessionPhase, validation::validate_label},
    state::{catalog::ScoringCatalog, session::ScoringSession},
};

/// Match and team selection that opens a scoring session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartSessionRequest {
    /// Qualification match being scouted.
    #[validate(range(min = 1))]
    pub match_number: u32,
    /// Team watched in that match.
    #[validate(range(min = 1))]
    pub team_number: u32,
}

/// Switch the active scoring mode by name.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectModeRequest {
    /// Catalog mode name.
    #[validate(custom(function = "validate_label"))]
    pub mode: String,
}

/// Click on a scoring item by name.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClickRequest {
    /// Catalog item name.
    #[validate(custom(function = "validate_label"))]
    pub item: String,
}

/// One recorded value of the current session.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct ScoreValue {
    /// Item name.
    pub item: String,
    /// Mode the value was scored in.
    pub mode: String,
    /// Tally count or flag value.
    pub value: u32,
}

/// State of the scoring session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Event the session reports to.
    pub event_id: String,
    /// Match being scouted.
    pub match_number: u32,
    /// Team being scouted.
    pub team_number: u32,
    /// Lifecycle phase.
    pub phase: VisibleSessionPhase,
    /// Selected mode; absent until the scout picks one.
    pub active_mode: Option<String>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Non-zero values in first-click order.
    pub scores: Vec<ScoreValue>,
}

impl SessionSummary {
    /// Project a session, resolving ids to catalog names.
    pub fn from_session(session: &ScoringSession, catalog: &ScoringCatalog) -> Self {
        let scores = session
            .ledger()
            .recorded()
            .map(|state| ScoreValue {
                item: catalog
                    .item(state.item_id)
                    .map(|item| item.name.clone())
                    .unwrap_or_else(|| state.item_id.to_string()),
                mode: catalog
                    .mode(state.mode_id)
                    .map(|mode| mode.name.clone())
                    .unwrap_or_else(|| state.mode_id.to_string()),
                value: state.value,
            })
            .collect();

        Self {
            event_id: session.event_id().to_string(),
            match_number: session.match_number(),
            team_number: session.team_number(),
            phase: session.phase().into(),
            active_mode: session
                .active_mode()
                .and_then(|mode| catalog.mode(mode))
                .map(|mode| mode.name.clone()),
            created_at: format_timestamp(session.created_at()),
            scores,
        }
    }
}

/// Result of a click; `recorded` is false when the active mode gates the item.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct ClickResponse {
    /// Whether the click changed a value.
    pub recorded: bool,
    /// Mode the click was booked under.
    pub mode: Option<String>,
    /// Value after the click.
    pub value: Option<u32>,
}

impl ClickResponse {
    /// Response for a click the mode gate swallowed.
    pub fn ignored() -> Self {
        Self {
            recorded: false,
            mode: None,
            value: None,
        }
    }
}

/// Where a submitted report ended up.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The central server confirmed receipt.
    Sent,
    /// Kept in saved scores for a later resend.
    Queued,
    /// A resend is already delivering this report.
    InFlight,
}

/// Answer to a submit request.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    /// Identifier of the saved report.
    pub report_id: Uuid,
    /// Outcome of the single delivery attempt.
    pub delivery: DeliveryStatus,
    /// Why the delivery attempt failed, when queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
