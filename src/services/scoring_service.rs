//! Business logic behind the scoring session routes: match selection, mode
//! changes, clicks and the submit handoff to saved scores.

use tracing::{debug, info, warn};

use crate::{
    dao::models::ScoreReport,
    dto::{
        catalog::CatalogSummary,
        session::{
            ClickResponse, DeliveryStatus, SessionSummary, StartSessionRequest, SubmitResponse,
        },
    },
    error::ServiceError,
    services::submission_queue::DeliveryResult,
    state::{SharedState, item::ClickOutcome, session::ScoringSession},
};

fn no_session() -> ServiceError {
    ServiceError::InvalidState("no active scoring session; select a match and team first".into())
}

/// Modes and items of the loaded catalog.
pub async fn catalog(state: &SharedState) -> Result<CatalogSummary, ServiceError> {
    let catalog = state.require_catalog().await?;
    Ok(CatalogSummary::from(catalog.as_ref()))
}

/// Open a session for a match and team, replacing any current one.
pub async fn start_session(
    state: &SharedState,
    request: StartSessionRequest,
) -> Result<SessionSummary, ServiceError> {
    let catalog = state.require_catalog().await?;
    let session = ScoringSession::new(
        &catalog,
        state.event_id(),
        request.match_number,
        request.team_number,
    );
    let summary = SessionSummary::from_session(&session, &catalog);

    let mut slot = state.session().lock().await;
    if let Some(previous) = slot.replace(session) {
        if previous.ledger().has_recorded_values() {
            warn!(
                match_number = previous.match_number(),
                team_number = previous.team_number(),
                "discarding unsubmitted scores of the previous session"
            );
        }
    }
    info!(
        event_id = %summary.event_id,
        match_number = summary.match_number,
        team_number = summary.team_number,
        "scoring session started"
    );
    Ok(summary)
}

/// Snapshot of the current session.
pub async fn current_session(state: &SharedState) -> Result<SessionSummary, ServiceError> {
    let catalog = state.require_catalog().await?;
    let slot = state.session().lock().await;
    let session = slot.as_ref().ok_or_else(no_session)?;
    Ok(SessionSummary::from_session(session, &catalog))
}

/// Drop the current session without submitting anything.
pub async fn abandon_session(state: &SharedState) -> Result<(), ServiceError> {
    let session = state.session().lock().await.take().ok_or_else(no_session)?;
    info!(
        match_number = session.match_number(),
        team_number = session.team_number(),
        "scoring session abandoned"
    );
    Ok(())
}

/// Activate the mode with the given name.
pub async fn select_mode(state: &SharedState, name: &str) -> Result<SessionSummary, ServiceError> {
    let catalog = state.require_catalog().await?;
    let mode = catalog
        .mode_by_name(name)
        .ok_or_else(|| ServiceError::NotFound(format!("mode `{name}`")))?;

    let mut slot = state.session().lock().await;
    let session = slot.as_mut().ok_or_else(no_session)?;
    session.select_mode(&catalog, mode.id)?;
    debug!(mode = %mode.name, "scoring mode selected");
    Ok(SessionSummary::from_session(session, &catalog))
}

/// Forward a click to the named item. A click gated by the active mode is not an error.
pub async fn click_item(state: &SharedState, name: &str) -> Result<ClickResponse, ServiceError> {
    let catalog = state.require_catalog().await?;
    let item = catalog
        .item_by_name(name)
        .ok_or_else(|| ServiceError::NotFound(format!("scoring item `{name}`")))?;

    let mut slot = state.session().lock().await;
    let session = slot.as_mut().ok_or_else(no_session)?;
    match session.click(item.id)? {
        ClickOutcome::Recorded { mode_id, value } => Ok(ClickResponse {
            recorded: true,
            mode: catalog.mode(mode_id).map(|mode| mode.name.clone()),
            value: Some(value),
        }),
        ClickOutcome::Ignored => {
            debug!(item = %item.name, "click ignored by mode gate");
            Ok(ClickResponse::ignored())
        }
    }
}

/// Turn the session into a report, save it, then try to deliver it once.
///
/// The report is durably queued before any network call. When saving fails the
/// session stays open so the scout can retry.
pub async fn submit(state: &SharedState) -> Result<SubmitResponse, ServiceError> {
    // Detached so a dropped request cannot leave the session in `Submitting`.
    let report = tokio::spawn(hand_off(state.clone()))
        .await
        .map_err(|err| ServiceError::Internal(format!("submit handoff did not finish: {err}")))??;

    let result = state
        .queue()
        .deliver(state.sender().as_ref(), &report)
        .await?;

    let response = match result {
        DeliveryResult::Sent => SubmitResponse {
            report_id: report.id,
            delivery: DeliveryStatus::Sent,
            error: None,
        },
        DeliveryResult::Failed { failure, .. } => SubmitResponse {
            report_id: report.id,
            delivery: DeliveryStatus::Queued,
            error: Some(failure.to_string()),
        },
        DeliveryResult::InFlight => SubmitResponse {
            report_id: report.id,
            delivery: DeliveryStatus::InFlight,
            error: None,
        },
    };
    Ok(response)
}

/// Persist the session's report and close the session, or reopen it when saving fails.
async fn hand_off(state: SharedState) -> Result<ScoreReport, ServiceError> {
    let mut slot = state.session().lock().await;
    let session = slot.as_mut().ok_or_else(no_session)?;
    let report = session.begin_submit()?;

    if let Err(err) = state.queue().enqueue(report.clone()).await {
        session.abort_handoff()?;
        return Err(err.into());
    }
    session.complete_handoff()?;
    slot.take();
    Ok(report)
}
