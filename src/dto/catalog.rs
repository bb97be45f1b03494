//! Scoring catalog as shown to the UI.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::catalog::{ItemKind, ScoringCatalog};

/// One scoring mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModeSummary {
    /// Catalog mode id.
    pub id: u32,
    /// Name used to select the mode.
    pub name: String,
}

/// One scoring item and its mode restriction.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemSummary {
    /// Catalog item id.
    pub id: u32,
    /// Name used to click the item.
    pub name: String,
    /// Tally or flag.
    pub kind: ItemKind,
    /// Name of the only mode in which the item accepts clicks.
    pub only_for_mode: Option<String>,
}

/// Modes and items in catalog order.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogSummary {
    /// Modes; the first one also books clicks made before any mode is chosen.
    pub modes: Vec<ModeSummary>,
    /// Scoring items.
    pub items: Vec<ItemSummary>,
}

impl From<&ScoringCatalog> for CatalogSummary {
    fn from(catalog: &ScoringCatalog) -> Self {
        Self {
            modes: catalog
                .modes()
                .map(|mode| ModeSummary {
                    id: mode.id.0,
                    name: mode.name.clone(),
                })
                .collect(),
            items: catalog
                .items()
                .map(|item| ItemSummary {
                    id: item.id.0,
                    name: item.name.clone(),
                    kind: item.kind,
                    only_for_mode: item
                        .restricted_to_mode
                        .and_then(|mode| catalog.mode(mode))
                        .map(|mode| mode.name.clone()),
                })
                .collect(),
        }
    }
}
