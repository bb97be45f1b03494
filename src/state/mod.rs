/// Modes and scoring items of the event.
pub mod catalog;
/// Mode-gated scoring items.
pub mod item;
/// Per-session (mode, item) values.
pub mod ledger;
/// Active mode broadcast.
pub mod mode;
/// Scoring session lifecycle.
pub mod session;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    dao::{central::ScoreSender, queue_store::QueueStore},
    error::ServiceError,
    services::{resend_manager::ResendManager, submission_queue::SubmissionQueue},
};

use self::{catalog::ScoringCatalog, session::ScoringSession};

/// Handle on the station state shared by every route and background task.
pub type SharedState = Arc<AppState>;

/// Central station state: catalog, current scoring session, saved scores queue and server link.
pub struct AppState {
    event_id: String,
    catalog: RwLock<Option<Arc<ScoringCatalog>>>,
    session: Mutex<Option<ScoringSession>>,
    queue: Arc<SubmissionQueue>,
    sender: Arc<dyn ScoreSender>,
    resend: ResendManager,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The station starts in degraded mode until a scoring catalog is installed.
    pub fn new(
        event_id: impl Into<String>,
        store: Arc<dyn QueueStore>,
        sender: Arc<dyn ScoreSender>,
    ) -> SharedState {
        let queue = Arc::new(SubmissionQueue::new(store));
        Arc::new(Self {
            event_id: event_id.into(),
            catalog: RwLock::new(None),
            session: Mutex::new(None),
            resend: ResendManager::new(queue.clone(), sender.clone()),
            queue,
            sender,
        })
    }

    /// Event code stamped on every new session.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Obtain the installed catalog, if any.
    pub async fn catalog(&self) -> Option<Arc<ScoringCatalog>> {
        self.catalog.read().await.clone()
    }

    /// Obtain the catalog or fail with [`ServiceError::Degraded`].
    pub async fn require_catalog(&self) -> Result<Arc<ScoringCatalog>, ServiceError> {
        self.catalog().await.ok_or(ServiceError::Degraded)
    }

    /// Install the scoring catalog and leave degraded mode.
    pub async fn install_catalog(&self, catalog: ScoringCatalog) {
        let mut guard = self.catalog.write().await;
        *guard = Some(Arc::new(catalog));
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        self.catalog.read().await.is_none()
    }

    /// Slot holding the scoring session currently being captured.
    pub fn session(&self) -> &Mutex<Option<ScoringSession>> {
        &self.session
    }

    /// Saved scores queue.
    pub fn queue(&self) -> &Arc<SubmissionQueue> {
        &self.queue
    }

    /// Link to the central scoring server.
    pub fn sender(&self) -> &Arc<dyn ScoreSender> {
        &self.sender
    }

    /// Operator resend workflow.
    pub fn resend(&self) -> &ResendManager {
        &self.resend
    }
}
