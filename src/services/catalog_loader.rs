use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::central::CentralResult,
    state::{SharedState, catalog::ScoringCatalog},
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Fetch the scoring catalog with exponential backoff, then leave degraded mode.
///
/// Returns once a catalog is installed; the catalog never changes afterwards.
pub async fn run<F, Fut>(state: SharedState, mut fetch: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = CentralResult<ScoringCatalog>> + Send,
{
    let mut delay = INITIAL_DELAY;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match fetch().await {
            Ok(catalog) => {
                info!(
                    attempt,
                    modes = catalog.modes().count(),
                    items = catalog.items().count(),
                    "scoring catalog loaded; leaving degraded mode"
                );
                state.install_catalog(catalog).await;
                return;
            }
            Err(err) => {
                warn!(attempt, error = %err, "scoring catalog fetch failed; staying in degraded mode");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;
    use crate::{
        dao::central::CentralError,
        services::submission_queue::testing::{MemoryQueueStore, ScriptedSender},
        state::{
            AppState,
            catalog::{CatalogError, sample_catalog},
        },
    };

    #[tokio::test(start_paused = true)]
    async fn retries_until_catalog_arrives() {
        let state = AppState::new(
            "CALA",
            Arc::new(MemoryQueueStore::default()),
            Arc::new(ScriptedSender::default()),
        );
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        run(state.clone(), move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call < 2 {
                    Err(CentralError::Catalog(CatalogError::DuplicateMode(1)))
                } else {
                    Ok(sample_catalog())
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!state.is_degraded().await);
        assert!(state.catalog().await.unwrap().item_by_name("AutoMove").is_some());
    }
}
