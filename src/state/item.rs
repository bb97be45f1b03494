use tokio::sync::watch;

use crate::{
    dao::models::ScoreRecord,
    state::{
        catalog::{ModeId, ScoringItemDefinition},
        ledger::ScoreLedger,
    },
};

/// Result of a click on a scoring item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click was accepted and the ledger now holds `value` for `mode_id`.
    Recorded {
        /// Mode the click was booked under.
        mode_id: ModeId,
        /// Value after the click.
        value: u32,
    },
    /// The item is restricted to a mode that is not active.
    Ignored,
}

/// A scoring element wired to the session's mode selector.
///
/// Unrestricted items accept clicks before any mode is chosen; those clicks are
/// booked under `opening_mode`, the catalog's first mode.
#[derive(Debug, Clone)]
pub struct ScoringItem {
    definition: ScoringItemDefinition,
    active_mode: watch::Receiver<Option<ModeId>>,
    opening_mode: Option<ModeId>,
}

impl ScoringItem {
    /// Item gated by `active_mode`, booking pre-mode clicks under `opening_mode`.
    pub fn new(
        definition: ScoringItemDefinition,
        active_mode: watch::Receiver<Option<ModeId>>,
        opening_mode: Option<ModeId>,
    ) -> Self {
        Self {
            definition,
            active_mode,
            opening_mode,
        }
    }

    /// Catalog definition the item was built from.
    pub fn definition(&self) -> &ScoringItemDefinition {
        &self.definition
    }

    /// Mode the next click would be recorded under, or `None` when gated.
    pub fn accepting_mode(&self) -> Option<ModeId> {
        let active = *self.active_mode.borrow();
        match self.definition.restricted_to_mode {
            Some(restricted) => (active == Some(restricted)).then_some(restricted),
            None => active.or(self.opening_mode),
        }
    }

    /// Apply a click to the ledger. Gated clicks are a silent no-op.
    pub fn clicked(&self, ledger: &mut ScoreLedger) -> ClickOutcome {
        let Some(mode_id) = self.accepting_mode() else {
            return ClickOutcome::Ignored;
        };
        let value = ledger.record_click(mode_id, self.definition.id, self.definition.kind);
        ClickOutcome::Recorded { mode_id, value }
    }

    /// Report record for `mode_id`; zero values are omitted.
    pub fn snapshot(&self, ledger: &ScoreLedger, mode_id: ModeId) -> Option<ScoreRecord> {
        let value = ledger.value(mode_id, self.definition.id);
        (value > 0).then_some(ScoreRecord {
            item_id: self.definition.id,
            mode_id,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        catalog::{ItemId, ItemKind},
        mode::ModeSelector,
    };

    const AUTO: ModeId = ModeId(1);
    const TELEOP: ModeId = ModeId(2);

    fn item(selector: &ModeSelector, kind: ItemKind, restricted: Option<ModeId>) -> ScoringItem {
        ScoringItem::new(
            ScoringItemDefinition {
                id: ItemId(10),
                name: "AutoMove".into(),
                kind,
                restricted_to_mode: restricted,
            },
            selector.subscribe(),
            Some(AUTO),
        )
    }

    #[test]
    fn restricted_tally_only_counts_in_its_mode() {
        let selector = ModeSelector::new();
        let auto_move = item(&selector, ItemKind::Tally, Some(AUTO));
        let mut ledger = ScoreLedger::new();

        selector.select_mode(TELEOP);
        for _ in 0..3 {
            assert_eq!(auto_move.clicked(&mut ledger), ClickOutcome::Ignored);
        }
        assert_eq!(ledger.value(AUTO, ItemId(10)), 0);
        assert_eq!(ledger.value(TELEOP, ItemId(10)), 0);

        selector.select_mode(AUTO);
        for _ in 0..3 {
            auto_move.clicked(&mut ledger);
        }
        assert_eq!(ledger.value(AUTO, ItemId(10)), 3);
        assert!(ledger.get(TELEOP, ItemId(10)).is_none());
    }

    #[test]
    fn before_any_mode_only_restricted_items_are_inert() {
        let selector = ModeSelector::new();
        let free = item(&selector, ItemKind::Tally, None);
        let restricted = item(&selector, ItemKind::Tally, Some(AUTO));
        let mut ledger = ScoreLedger::new();

        assert_eq!(restricted.clicked(&mut ledger), ClickOutcome::Ignored);
        assert_eq!(
            free.clicked(&mut ledger),
            ClickOutcome::Recorded {
                mode_id: AUTO,
                value: 1
            }
        );

        selector.select_mode(TELEOP);
        assert_eq!(
            free.clicked(&mut ledger),
            ClickOutcome::Recorded {
                mode_id: TELEOP,
                value: 1
            }
        );
        assert_eq!(ledger.value(AUTO, ItemId(10)), 1);
    }

    #[test]
    fn catalog_without_modes_gates_everything() {
        let selector = ModeSelector::new();
        let free = ScoringItem::new(
            ScoringItemDefinition {
                id: ItemId(11),
                name: "Parked".into(),
                kind: ItemKind::Flag,
                restricted_to_mode: None,
            },
            selector.subscribe(),
            None,
        );
        let mut ledger = ScoreLedger::new();

        assert_eq!(free.clicked(&mut ledger), ClickOutcome::Ignored);
        assert!(ledger.is_empty());
    }

    #[test]
    fn flag_toggles_and_snapshot_skips_zero() {
        let selector = ModeSelector::new();
        let parked = item(&selector, ItemKind::Flag, None);
        let mut ledger = ScoreLedger::new();
        selector.select_mode(TELEOP);

        parked.clicked(&mut ledger);
        assert_eq!(
            parked.snapshot(&ledger, TELEOP),
            Some(ScoreRecord {
                item_id: ItemId(10),
                mode_id: TELEOP,
                value: 1
            })
        );

        parked.clicked(&mut ledger);
        assert_eq!(parked.snapshot(&ledger, TELEOP), None);
    }
}
