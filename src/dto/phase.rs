use serde::Serialize;
use utoipa::ToSchema;

use crate::state::session::SessionPhase;

/// Scoring session phase exposed to the UI.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleSessionPhase {
    /// Accepting clicks and mode changes.
    Open,
    /// The report is being written to saved scores.
    Submitting,
    /// Submitted; a new match must be selected.
    Closed,
}

impl From<SessionPhase> for VisibleSessionPhase {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::Open => VisibleSessionPhase::Open,
            SessionPhase::Submitting => VisibleSessionPhase::Submitting,
            SessionPhase::Closed => VisibleSessionPhase::Closed,
        }
    }
}
