use tokio::sync::watch;

use crate::state::catalog::ModeId;

/// Tracks the active scoring mode and fans changes out to every subscribed item.
///
/// Starts with no active mode, so mode-restricted items stay inert until the
/// scout picks one.
#[derive(Debug)]
pub struct ModeSelector {
    active: watch::Sender<Option<ModeId>>,
}

impl Default for ModeSelector {
    fn default() -> Self {
        let (active, _rx) = watch::channel(None);
        Self { active }
    }
}

impl ModeSelector {
    /// Selector with no active mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active mode, if any has been selected.
    pub fn active(&self) -> Option<ModeId> {
        *self.active.borrow()
    }

    /// Make `id` the active mode. Subscribers observe the change on their next read.
    pub fn select_mode(&self, id: ModeId) {
        self.active.send_replace(Some(id));
    }

    /// Receiver handed to each scoring item so clicks can be gated on the active mode.
    pub fn subscribe(&self) -> watch::Receiver<Option<ModeId>> {
        self.active.subscribe()
    }
}
