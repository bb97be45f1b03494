//! Scoring catalog: the modes and scoring items published by the central server.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Identifier of a scoring phase (the catalog's `mode_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeId(pub u32);

/// Identifier of a scoring item (the catalog's `scoring_item_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ModeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mode#{}", self.0)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// How a scoring item reacts to a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ItemKind {
    /// Counts occurrences (balls in a goal).
    #[serde(rename = "score_tally")]
    Tally,
    /// Records whether something happened at all.
    #[serde(rename = "score_flag")]
    Flag,
}

/// Immutable description of a scoring phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDefinition {
    /// Catalog id.
    pub id: ModeId,
    /// Name the UI selects the mode by.
    pub name: String,
}

/// Immutable description of a scoring item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringItemDefinition {
    /// Catalog id.
    pub id: ItemId,
    /// Name the UI clicks the item by.
    pub name: String,
    /// Tally or flag behaviour.
    pub kind: ItemKind,
    /// When set, the item only accepts clicks while this mode is active.
    pub restricted_to_mode: Option<ModeId>,
}

/// Errors raised while turning the catalog payload into definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An item names a restriction mode the catalog does not define.
    #[error("scoring item `{item}` is restricted to unknown mode `{mode}`")]
    UnknownRestrictionMode {
        /// Offending item name.
        item: String,
        /// Mode name it referenced.
        mode: String,
    },
    /// Two modes share an id.
    #[error("duplicate mode id {0}")]
    DuplicateMode(u32),
    /// Two items share an id.
    #[error("duplicate scoring item id {0}")]
    DuplicateItem(u32),
}

/// Payload returned by `GET /api/gameModesAndScoringElements`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    /// Modes keyed by name, in game order.
    pub modes: IndexMap<String, ModeInfo>,
    /// Scoring items keyed by name.
    pub scoring_items: IndexMap<String, ItemInfo>,
}

/// Wire shape of one mode entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeInfo {
    /// Display and selection name.
    pub mode_name: String,
    /// Numeric id used in reports.
    pub mode_id: u32,
}

/// Wire shape of one scoring item entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInfo {
    /// Display and click name.
    pub name: String,
    /// Numeric id used in reports.
    pub scoring_item_id: u32,
    /// `score_tally` or `score_flag`.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Name of the only mode in which the item can be scored.
    #[serde(default)]
    pub only_for_mode: Option<String>,
}

/// All modes and scoring items available for the configured event, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct ScoringCatalog {
    modes: IndexMap<ModeId, ModeDefinition>,
    items: IndexMap<ItemId, ScoringItemDefinition>,
}

impl ScoringCatalog {
    /// Assemble a catalog from already-resolved definitions.
    pub fn new(
        modes: impl IntoIterator<Item = ModeDefinition>,
        items: impl IntoIterator<Item = ScoringItemDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for mode in modes {
            if catalog.modes.contains_key(&mode.id) {
                return Err(CatalogError::DuplicateMode(mode.id.0));
            }
            catalog.modes.insert(mode.id, mode);
        }
        for item in items {
            if catalog.items.contains_key(&item.id) {
                return Err(CatalogError::DuplicateItem(item.id.0));
            }
            catalog.items.insert(item.id, item);
        }
        Ok(catalog)
    }

    /// Modes in catalog order.
    pub fn modes(&self) -> impl Iterator<Item = &ModeDefinition> {
        self.modes.values()
    }

    /// Items in catalog order.
    pub fn items(&self) -> impl Iterator<Item = &ScoringItemDefinition> {
        self.items.values()
    }

    /// Mode by id.
    pub fn mode(&self, id: ModeId) -> Option<&ModeDefinition> {
        self.modes.get(&id)
    }

    /// Item by id.
    pub fn item(&self, id: ItemId) -> Option<&ScoringItemDefinition> {
        self.items.get(&id)
    }

    /// Mode a match opens in: the first one the catalog lists.
    pub fn opening_mode(&self) -> Option<ModeId> {
        self.modes.keys().next().copied()
    }

    /// Look a mode up by the name the UI uses (`data-modename`).
    pub fn mode_by_name(&self, name: &str) -> Option<&ModeDefinition> {
        self.modes.values().find(|mode| mode.name == name)
    }

    /// Look an item up by the name the UI uses (`data-scorename`).
    pub fn item_by_name(&self, name: &str) -> Option<&ScoringItemDefinition> {
        self.items.values().find(|item| item.name == name)
    }
}

impl TryFrom<CatalogResponse> for ScoringCatalog {
    type Error = CatalogError;

    fn try_from(value: CatalogResponse) -> Result<Self, Self::Error> {
        let modes: Vec<ModeDefinition> = value
            .modes
            .into_values()
            .map(|info| ModeDefinition {
                id: ModeId(info.mode_id),
                name: info.mode_name,
            })
            .collect();

        let items = value
            .scoring_items
            .into_values()
            .map(|info| {
                let restricted_to_mode = match info.only_for_mode {
                    Some(mode_name) => {
                        let mode = modes.iter().find(|mode| mode.name == mode_name).ok_or_else(
                            || CatalogError::UnknownRestrictionMode {
                                item: info.name.clone(),
                                mode: mode_name.clone(),
                            },
                        )?;
                        Some(mode.id)
                    }
                    None => None,
                };
                Ok(ScoringItemDefinition {
                    id: ItemId(info.scoring_item_id),
                    name: info.name,
                    kind: info.kind,
                    restricted_to_mode,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Self::new(modes, items)
    }
}

/// Auto/Teleop catalog with one mode-restricted tally and one unrestricted flag.
#[cfg(test)]
pub(crate) fn sample_catalog() -> ScoringCatalog {
    let response: CatalogResponse = serde_json::from_str(tests::PAYLOAD).unwrap();
    ScoringCatalog::try_from(response).unwrap()
}
