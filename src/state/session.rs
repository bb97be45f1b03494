use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    dao::models::{ScoreRecord, ScoreReport},
    state::{
        catalog::{ItemId, ModeId, ScoringCatalog},
        item::{ClickOutcome, ScoringItem},
        ledger::ScoreLedger,
        mode::ModeSelector,
    },
};

/// Lifecycle phases of a scoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepting clicks and mode changes.
    Open,
    /// A report has been produced and is being handed to the queue.
    Submitting,
    /// The report is owned by the queue; the session is finished.
    Closed,
}

/// Events that move a session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The scout asked to submit the scores.
    SubmitRequested,
    /// The queue accepted the report.
    HandedOff,
    /// The queue could not persist the report; scoring resumes.
    HandoffFailed,
}

/// Error returned when an event cannot be applied from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the session was in when the event was received.
    pub from: SessionPhase,
    /// The rejected event.
    pub event: SessionEvent,
}

/// Errors raised by session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// The mode is not part of the catalog.
    #[error("unknown mode {0}")]
    UnknownMode(ModeId),
    /// The item is not part of the catalog.
    #[error("unknown scoring item {0}")]
    UnknownItem(ItemId),
    /// Submit with every value at zero.
    #[error("nothing has been scored for this match")]
    EmptySubmission,
    /// Input arrived after the session left `Open`.
    #[error("session is {0:?} and no longer accepts input")]
    NotOpen(SessionPhase),
    /// The lifecycle event is not valid from the current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// Scoring context for one team in one match.
///
/// Owns its mode selector, its items and the ledger they write to; none of it
/// outlives the session.
#[derive(Debug)]
pub struct ScoringSession {
    event_id: String,
    match_number: u32,
    team_number: u32,
    created_at: OffsetDateTime,
    phase: SessionPhase,
    modes: ModeSelector,
    items: Vec<ScoringItem>,
    ledger: ScoreLedger,
}

impl ScoringSession {
    /// Open a session for the given match and team using the catalog's items.
    pub fn new(
        catalog: &ScoringCatalog,
        event_id: impl Into<String>,
        match_number: u32,
        team_number: u32,
    ) -> Self {
        let modes = ModeSelector::new();
        let opening_mode = catalog.opening_mode();
        let items = catalog
            .items()
            .cloned()
            .map(|definition| ScoringItem::new(definition, modes.subscribe(), opening_mode))
            .collect();
        Self {
            event_id: event_id.into(),
            match_number,
            team_number,
            created_at: OffsetDateTime::now_utc(),
            phase: SessionPhase::Open,
            modes,
            items,
            ledger: ScoreLedger::new(),
        }
    }

    /// Event the report will be filed under.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Match being scouted.
    pub fn match_number(&self) -> u32 {
        self.match_number
    }

    /// Team being scouted.
    pub fn team_number(&self) -> u32 {
        self.team_number
    }

    /// When the match and team were selected.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Mode chosen by the scout, if any.
    pub fn active_mode(&self) -> Option<ModeId> {
        self.modes.active()
    }

    /// Values captured so far.
    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// Switch the active mode. The id must belong to the catalog the session was built from.
    pub fn select_mode(&mut self, catalog: &ScoringCatalog, mode_id: ModeId) -> Result<(), ScoringError> {
        self.ensure_open()?;
        if catalog.mode(mode_id).is_none() {
            return Err(ScoringError::UnknownMode(mode_id));
        }
        self.modes.select_mode(mode_id);
        Ok(())
    }

    /// Forward a click to the item; gating happens inside the item.
    pub fn click(&mut self, item_id: ItemId) -> Result<ClickOutcome, ScoringError> {
        self.ensure_open()?;
        let item = self
            .items
            .iter()
            .find(|item| item.definition().id == item_id)
            .ok_or(ScoringError::UnknownItem(item_id))?;
        Ok(item.clicked(&mut self.ledger))
    }

    /// Snapshot the ledger into a report and move to `Submitting`.
    ///
    /// The returned report is detached from the ledger: later changes never reach it.
    pub fn begin_submit(&mut self) -> Result<ScoreReport, ScoringError> {
        if self.phase == SessionPhase::Open && !self.ledger.has_recorded_values() {
            return Err(ScoringError::EmptySubmission);
        }
        let next = self.compute_transition(SessionEvent::SubmitRequested)?;

        let records: Vec<ScoreRecord> = self
            .ledger
            .recorded()
            .filter_map(|state| {
                self.items
                    .iter()
                    .find(|item| item.definition().id == state.item_id)
                    .and_then(|item| item.snapshot(&self.ledger, state.mode_id))
            })
            .collect();

        self.phase = next;
        Ok(ScoreReport::new(
            self.event_id.clone(),
            self.match_number,
            self.team_number,
            records,
        ))
    }

    /// The queue owns the report now.
    pub fn complete_handoff(&mut self) -> Result<(), ScoringError> {
        self.phase = self.compute_transition(SessionEvent::HandedOff)?;
        Ok(())
    }

    /// Return to `Open` after the queue failed to take the report.
    pub fn abort_handoff(&mut self) -> Result<(), ScoringError> {
        self.phase = self.compute_transition(SessionEvent::HandoffFailed)?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ScoringError> {
        match self.phase {
            SessionPhase::Open => Ok(()),
            other => Err(ScoringError::NotOpen(other)),
        }
    }

    fn compute_transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (SessionPhase::Open, SessionEvent::SubmitRequested) => SessionPhase::Submitting,
            (SessionPhase::Submitting, SessionEvent::HandedOff) => SessionPhase::Closed,
            (SessionPhase::Submitting, SessionEvent::HandoffFailed) => SessionPhase::Open,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::{ItemKind, ModeDefinition, ScoringItemDefinition};

    const AUTO: ModeId = ModeId(1);
    const TELEOP: ModeId = ModeId(2);
    const AUTO_MOVE: ItemId = ItemId(1);
    const PARKED: ItemId = ItemId(2);

    fn catalog() -> ScoringCatalog {
        ScoringCatalog::new(
            vec![
                ModeDefinition {
                    id: AUTO,
                    name: "Auto".into(),
                },
                ModeDefinition {
                    id: TELEOP,
                    name: "Teleop".into(),
                },
            ],
            vec![
                ScoringItemDefinition {
                    id: AUTO_MOVE,
                    name: "AutoMove".into(),
                    kind: ItemKind::Tally,
                    restricted_to_mode: Some(AUTO),
                },
                ScoringItemDefinition {
                    id: PARKED,
                    name: "Parked".into(),
                    kind: ItemKind::Flag,
                    restricted_to_mode: None,
                },
            ],
        )
        .unwrap()
    }

    fn session(catalog: &ScoringCatalog) -> ScoringSession {
        ScoringSession::new(catalog, "E1", 4, 2584)
    }

    #[test]
    fn new_session_is_open_without_mode() {
        let catalog = catalog();
        let session = session(&catalog);
        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.active_mode(), None);
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn unrestricted_click_before_any_mode_is_booked_under_the_opening_mode() {
        let catalog = catalog();
        let mut session = session(&catalog);

        assert_eq!(session.click(AUTO_MOVE).unwrap(), ClickOutcome::Ignored);
        assert_eq!(
            session.click(PARKED).unwrap(),
            ClickOutcome::Recorded {
                mode_id: AUTO,
                value: 1
            }
        );
        assert_eq!(session.active_mode(), None);

        let report = session.begin_submit().unwrap();
        assert_eq!(
            report.records,
            vec![ScoreRecord {
                item_id: PARKED,
                mode_id: AUTO,
                value: 1
            }]
        );
    }

    #[test]
    fn gated_clicks_then_permitted_clicks() {
        let catalog = catalog();
        let mut session = session(&catalog);

        session.select_mode(&catalog, TELEOP).unwrap();
        for _ in 0..3 {
            assert_eq!(session.click(AUTO_MOVE).unwrap(), ClickOutcome::Ignored);
        }
        assert_eq!(session.ledger().value(AUTO, AUTO_MOVE), 0);

        session.select_mode(&catalog, AUTO).unwrap();
        for _ in 0..3 {
            session.click(AUTO_MOVE).unwrap();
        }
        assert_eq!(session.ledger().value(AUTO, AUTO_MOVE), 3);
    }

    #[test]
    fn empty_submission_is_rejected_and_session_stays_open() {
        let catalog = catalog();
        let mut session = session(&catalog);
        session.select_mode(&catalog, TELEOP).unwrap();
        session.click(PARKED).unwrap();
        session.click(PARKED).unwrap();

        assert_eq!(session.begin_submit().unwrap_err(), ScoringError::EmptySubmission);
        assert_eq!(session.phase(), SessionPhase::Open);
    }

    #[test]
    fn submit_snapshots_ledger_and_closes() {
        let catalog = catalog();
        let mut session = session(&catalog);
        session.select_mode(&catalog, AUTO).unwrap();
        session.click(AUTO_MOVE).unwrap();
        session.click(AUTO_MOVE).unwrap();
        session.select_mode(&catalog, TELEOP).unwrap();
        session.click(PARKED).unwrap();

        let report = session.begin_submit().unwrap();
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert_eq!(report.event_id, "E1");
        assert_eq!(report.match_number, 4);
        assert_eq!(report.team_number, 2584);
        assert_eq!(
            report.records,
            vec![
                ScoreRecord {
                    item_id: AUTO_MOVE,
                    mode_id: AUTO,
                    value: 2
                },
                ScoreRecord {
                    item_id: PARKED,
                    mode_id: TELEOP,
                    value: 1
                },
            ]
        );

        assert_eq!(
            session.click(PARKED).unwrap_err(),
            ScoringError::NotOpen(SessionPhase::Submitting)
        );

        session.complete_handoff().unwrap();
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[test]
    fn failed_handoff_reopens_session() {
        let catalog = catalog();
        let mut session = session(&catalog);
        session.select_mode(&catalog, TELEOP).unwrap();
        session.click(PARKED).unwrap();

        session.begin_submit().unwrap();
        session.abort_handoff().unwrap();

        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.ledger().value(TELEOP, PARKED), 1);
        session.click(PARKED).unwrap();
        assert_eq!(session.ledger().value(TELEOP, PARKED), 0);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let catalog = catalog();
        let mut session = session(&catalog);
        let err = session.complete_handoff().unwrap_err();
        match err {
            ScoringError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, SessionPhase::Open);
                assert_eq!(invalid.event, SessionEvent::HandedOff);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn closed_session_cannot_submit_twice() {
        let catalog = catalog();
        let mut session = session(&catalog);
        session.select_mode(&catalog, TELEOP).unwrap();
        session.click(PARKED).unwrap();
        session.begin_submit().unwrap();
        session.complete_handoff().unwrap();

        assert!(matches!(
            session.begin_submit().unwrap_err(),
            ScoringError::InvalidTransition(InvalidTransition {
                from: SessionPhase::Closed,
                event: SessionEvent::SubmitRequested
            })
        ));
    }

    #[test]
    fn unknown_mode_and_item_are_rejected() {
        let catalog = catalog();
        let mut session = session(&catalog);
        assert_eq!(
            session.select_mode(&catalog, ModeId(99)).unwrap_err(),
            ScoringError::UnknownMode(ModeId(99))
        );
        assert_eq!(
            session.click(ItemId(99)).unwrap_err(),
            ScoringError::UnknownItem(ItemId(99))
        );
    }
}
