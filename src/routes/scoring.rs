use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        catalog::CatalogSummary,
        session::{
            ClickRequest, ClickResponse, SelectModeRequest, SessionSummary, StartSessionRequest,
            SubmitResponse,
        },
    },
    error::AppError,
    services::scoring_service,
    state::SharedState,
};

/// Scoring catalog and session endpoints used by the scouting UI.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/catalog", get(get_catalog))
        .route(
            "/session",
            get(get_session).post(start_session).delete(abandon_session),
        )
        .route("/session/mode", post(select_mode))
        .route("/session/click", post(click_item))
        .route("/session/submit", post(submit_session))
}

/// Modes and scoring items published by the central server.
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "scoring",
    responses(
        (status = 200, description = "Scoring catalog", body = CatalogSummary),
        (status = 503, description = "Catalog not loaded yet")
    )
)]
pub async fn get_catalog(State(state): State<SharedState>) -> Result<Json<CatalogSummary>, AppError> {
    Ok(Json(scoring_service::catalog(&state).await?))
}

/// Open a scoring session for a match and team, replacing the current one.
#[utoipa::path(
    post,
    path = "/session",
    tag = "scoring",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionSummary),
        (status = 400, description = "Invalid match or team number"),
        (status = 503, description = "Catalog not loaded yet")
    )
)]
pub async fn start_session(
    State(state): State<SharedState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    payload.validate()?;
    Ok(Json(scoring_service::start_session(&state, payload).await?))
}

/// Current scoring session.
#[utoipa::path(
    get,
    path = "/session",
    tag = "scoring",
    responses(
        (status = 200, description = "Current session", body = SessionSummary),
        (status = 409, description = "No active session")
    )
)]
pub async fn get_session(State(state): State<SharedState>) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(scoring_service::current_session(&state).await?))
}

/// Abandon the current session without submitting.
#[utoipa::path(
    delete,
    path = "/session",
    tag = "scoring",
    responses(
        (status = 204, description = "Session abandoned"),
        (status = 409, description = "No active session")
    )
)]
pub async fn abandon_session(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    scoring_service::abandon_session(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Switch the active scoring mode.
#[utoipa::path(
    post,
    path = "/session/mode",
    tag = "scoring",
    request_body = SelectModeRequest,
    responses(
        (status = 200, description = "Mode selected", body = SessionSummary),
        (status = 404, description = "Unknown mode"),
        (status = 409, description = "No open session")
    )
)]
pub async fn select_mode(
    State(state): State<SharedState>,
    Json(payload): Json<SelectModeRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    payload.validate()?;
    Ok(Json(scoring_service::select_mode(&state, &payload.mode).await?))
}

/// Record a click on a scoring item; clicks outside the item's mode are ignored.
#[utoipa::path(
    post,
    path = "/session/click",
    tag = "scoring",
    request_body = ClickRequest,
    responses(
        (status = 200, description = "Click processed", body = ClickResponse),
        (status = 404, description = "Unknown scoring item"),
        (status = 409, description = "No open session")
    )
)]
pub async fn click_item(
    State(state): State<SharedState>,
    Json(payload): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, AppError> {
    payload.validate()?;
    Ok(Json(scoring_service::click_item(&state, &payload.item).await?))
}

/// Save the session as a report and try to deliver it.
#[utoipa::path(
    post,
    path = "/session/submit",
    tag = "scoring",
    responses(
        (status = 200, description = "Report saved; delivered or queued", body = SubmitResponse),
        (status = 400, description = "Nothing scored"),
        (status = 409, description = "No open session"),
        (status = 500, description = "Saved scores could not be written")
    )
)]
pub async fn submit_session(State(state): State<SharedState>) -> Result<Json<SubmitResponse>, AppError> {
    Ok(Json(scoring_service::submit(&state).await?))
}
