use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scout relay station.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoring::get_catalog,
        crate::routes::scoring::start_session,
        crate::routes::scoring::get_session,
        crate::routes::scoring::abandon_session,
        crate::routes::scoring::select_mode,
        crate::routes::scoring::click_item,
        crate::routes::scoring::submit_session,
        crate::routes::resend::overview,
        crate::routes::resend::event_backlog,
        crate::routes::resend::submit_saved,
        crate::routes::resend::submit_event,
        crate::routes::resend::discard_report,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::catalog::CatalogSummary,
            crate::dto::catalog::ModeSummary,
            crate::dto::catalog::ItemSummary,
            crate::dto::phase::VisibleSessionPhase,
            crate::dto::session::StartSessionRequest,
            crate::dto::session::SelectModeRequest,
            crate::dto::session::ClickRequest,
            crate::dto::session::ClickResponse,
            crate::dto::session::ScoreValue,
            crate::dto::session::SessionSummary,
            crate::dto::session::DeliveryStatus,
            crate::dto::session::SubmitResponse,
            crate::dto::resend::SavedScore,
            crate::dto::resend::SavedReport,
            crate::dto::resend::ResendViewResponse,
            crate::dto::resend::ResendEntryResponse,
            crate::dto::resend::ResendSummaryResponse,
            crate::dao::models::ReportStatus,
            crate::state::catalog::ItemKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoring", description = "Scoring catalog and live session capture"),
        (name = "resend", description = "Saved scores review and redelivery"),
    )
)]
pub struct ApiDoc;
