use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Station health check.
pub mod health;
/// Saved scores (resend) workflow.
pub mod resend;
/// Catalog and scoring session.
pub mod scoring;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(scoring::router())
        .merge(resend::router())
        .merge(docs::router())
        .with_state(state)
}
