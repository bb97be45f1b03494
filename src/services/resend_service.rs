//! Thin service layer over [`ResendManager`] for the saved scores routes.

use uuid::Uuid;

use crate::{
    dto::resend::{ResendSummaryResponse, ResendViewResponse},
    error::ServiceError,
    services::resend_manager::EventSelection,
    state::SharedState,
};

/// What the saved scores screen shows when opened.
pub async fn overview(state: &SharedState) -> Result<ResendViewResponse, ServiceError> {
    Ok(state.resend().activate().await?.into())
}

/// Backlog of one event picked by the operator.
pub async fn event_backlog(
    state: &SharedState,
    event_id: &str,
) -> Result<ResendViewResponse, ServiceError> {
    Ok(state.resend().select_event(event_id).await?.into())
}

/// Resend the backlog, either of the single event with saved scores or of `event_id`.
pub async fn submit_saved(
    state: &SharedState,
    event_id: Option<String>,
) -> Result<ResendSummaryResponse, ServiceError> {
    let selection = match event_id {
        Some(event_id) => EventSelection::Explicit(event_id),
        None => EventSelection::Automatic,
    };
    Ok(state.resend().bulk_submit(selection).await?.into())
}

/// Drop one saved report.
pub async fn discard(state: &SharedState, event_id: &str, report_id: Uuid) -> Result<(), ServiceError> {
    if state.resend().discard(event_id, report_id).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "saved report {report_id} for event `{event_id}`"
        )))
    }
}
