use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::resend::{ResendSummaryResponse, ResendViewResponse},
    error::AppError,
    services::resend_service,
    state::SharedState,
};

/// Saved scores review and resend endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/resend", get(overview))
        .route("/resend/submit", post(submit_saved))
        .route("/resend/{event_id}", get(event_backlog))
        .route("/resend/{event_id}/submit", post(submit_event))
        .route("/resend/{event_id}/{report_id}", delete(discard_report))
}

/// Saved scores overview.
#[utoipa::path(
    get,
    path = "/resend",
    tag = "resend",
    responses(
        (status = 200, description = "Nothing saved, one backlog, or several events to pick from", body = ResendViewResponse),
        (status = 500, description = "Saved scores could not be read")
    )
)]
pub async fn overview(State(state): State<SharedState>) -> Result<Json<ResendViewResponse>, AppError> {
    Ok(Json(resend_service::overview(&state).await?))
}

/// Saved scores of one event.
#[utoipa::path(
    get,
    path = "/resend/{event_id}",
    tag = "resend",
    params(("event_id" = String, Path, description = "Event code")),
    responses((status = 200, description = "Event backlog", body = ResendViewResponse))
)]
pub async fn event_backlog(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
) -> Result<Json<ResendViewResponse>, AppError> {
    Ok(Json(resend_service::event_backlog(&state, &event_id).await?))
}

/// Resend the backlog of the only event with saved scores.
#[utoipa::path(
    post,
    path = "/resend/submit",
    tag = "resend",
    responses(
        (status = 200, description = "Per-report outcome", body = ResendSummaryResponse),
        (status = 409, description = "Several events have saved scores")
    )
)]
pub async fn submit_saved(
    State(state): State<SharedState>,
) -> Result<Json<ResendSummaryResponse>, AppError> {
    Ok(Json(resend_service::submit_saved(&state, None).await?))
}

/// Resend the backlog of one event.
#[utoipa::path(
    post,
    path = "/resend/{event_id}/submit",
    tag = "resend",
    params(("event_id" = String, Path, description = "Event code")),
    responses((status = 200, description = "Per-report outcome", body = ResendSummaryResponse))
)]
pub async fn submit_event(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
) -> Result<Json<ResendSummaryResponse>, AppError> {
    Ok(Json(resend_service::submit_saved(&state, Some(event_id)).await?))
}

/// Drop a saved report, e.g. one the server already holds.
#[utoipa::path(
    delete,
    path = "/resend/{event_id}/{report_id}",
    tag = "resend",
    params(
        ("event_id" = String, Path, description = "Event code"),
        ("report_id" = String, Path, description = "Saved report identifier")
    ),
    responses(
        (status = 204, description = "Report discarded"),
        (status = 404, description = "No such saved report")
    )
)]
pub async fn discard_report(
    State(state): State<SharedState>,
    Path((event_id, report_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    resend_service::discard(&state, &event_id, report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
