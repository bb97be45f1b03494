use tracing::{error, warn};

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode, saved scores backlog and server reachability.
///
/// An unreadable saved scores file outranks degraded mode: captured scores are at risk.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let pending = state.queue().pending_count().await;

    let server_reachable = state.sender().health_check().await;
    if !server_reachable {
        warn!("central scoring server unreachable");
    }

    let pending_reports = match pending {
        Ok(count) => Some(count),
        Err(err) => {
            error!(error = %err, "saved scores unreadable during health check");
            return HealthResponse::storage_error(server_reachable);
        }
    };

    if state.is_degraded().await {
        HealthResponse::degraded(pending_reports, server_reachable)
    } else {
        HealthResponse::ok(pending_reports, server_reachable)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, atomic::Ordering};

    use super::*;
    use crate::{
        dao::models::ScoreReport,
        services::submission_queue::testing::{MemoryQueueStore, ScriptedSender},
        state::{AppState, catalog::sample_catalog},
    };

    #[tokio::test]
    async fn reports_degraded_until_catalog_installed() {
        let sender = Arc::new(ScriptedSender::default());
        let state = AppState::new("CALA", Arc::new(MemoryQueueStore::default()), sender.clone());
        state
            .queue()
            .enqueue(ScoreReport::new("CALA", 1, 254, Vec::new()))
            .await
            .unwrap();

        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert_eq!(health.pending_reports, Some(1));
        assert!(!health.server_reachable);

        sender.reachable.store(true, Ordering::SeqCst);
        state.install_catalog(sample_catalog()).await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert!(health.server_reachable);
    }

    #[tokio::test]
    async fn unreadable_saved_scores_are_not_ok() {
        let store = Arc::new(MemoryQueueStore::default());
        let sender = Arc::new(ScriptedSender::default());
        sender.reachable.store(true, Ordering::SeqCst);
        let state = AppState::new("CALA", store.clone(), sender);
        state.install_catalog(sample_catalog()).await;
        store.fail_reads.store(true, Ordering::SeqCst);

        let health = health_status(&state).await;

        assert_eq!(health.status, "storage_error");
        assert_eq!(health.pending_reports, None);
        assert!(health.server_reachable);

        store.fail_reads.store(false, Ordering::SeqCst);
        assert_eq!(health_status(&state).await.status, "ok");
    }
}
