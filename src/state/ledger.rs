use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::state::catalog::{ItemId, ItemKind, ModeId};

/// Value of one scoring item within one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringItemState {
    /// Scoring item.
    pub item_id: ItemId,
    /// Mode the value belongs to.
    pub mode_id: ModeId,
    /// Tally count or flag value.
    pub value: u32,
}

/// Compute the value an item holds after one accepted click.
pub fn apply_click(kind: ItemKind, current: u32) -> u32 {
    match kind {
        ItemKind::Tally => current.saturating_add(1),
        ItemKind::Flag => {
            if current == 0 {
                1
            } else {
                0
            }
        }
    }
}

/// Per-session matrix of (mode, item) values.
///
/// Entries are created on the first accepted click for a pair and keep that
/// first-click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    entries: IndexMap<(ModeId, ItemId), ScoringItemState>,
}

impl ScoreLedger {
    /// Empty ledger; a fresh session starts every value at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one accepted click and return the new value.
    pub fn record_click(&mut self, mode_id: ModeId, item_id: ItemId, kind: ItemKind) -> u32 {
        let entry = self
            .entries
            .entry((mode_id, item_id))
            .or_insert(ScoringItemState {
                item_id,
                mode_id,
                value: 0,
            });
        entry.value = apply_click(kind, entry.value);
        entry.value
    }

    /// Current value, zero when never clicked.
    pub fn value(&self, mode_id: ModeId, item_id: ItemId) -> u32 {
        self.entries
            .get(&(mode_id, item_id))
            .map(|state| state.value)
            .unwrap_or(0)
    }

    /// Entry for a pair, if it was ever clicked.
    pub fn get(&self, mode_id: ModeId, item_id: ItemId) -> Option<&ScoringItemState> {
        self.entries.get(&(mode_id, item_id))
    }

    /// True when at least one entry holds a non-zero value.
    pub fn has_recorded_values(&self) -> bool {
        self.entries.values().any(|state| state.value > 0)
    }

    /// Non-zero entries in first-click order; zero values carry no information.
    pub fn recorded(&self) -> impl Iterator<Item = &ScoringItemState> {
        self.entries.values().filter(|state| state.value > 0)
    }

    /// Number of (mode, item) entries, zero values included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first accepted click.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
