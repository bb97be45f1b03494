use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok", "degraded" or "storage_error").
    pub status: String,
    /// Reports waiting in saved scores, across all events. Absent when the file cannot be read.
    pub pending_reports: Option<usize>,
    /// Whether the central scoring server answered its lifecheck.
    pub server_reachable: bool,
}

impl HealthResponse {
    /// Create a health response indicating the station is operational.
    pub fn ok(pending_reports: Option<usize>, server_reachable: bool) -> Self {
        Self {
            status: "ok".to_string(),
            pending_reports,
            server_reachable,
        }
    }

    /// Create a health response indicating the catalog is not loaded yet.
    pub fn degraded(pending_reports: Option<usize>, server_reachable: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            pending_reports,
            server_reachable,
        }
    }

    /// Create a health response indicating the saved scores file cannot be read.
    pub fn storage_error(server_reachable: bool) -> Self {
        Self {
            status: "storage_error".to_string(),
            pending_reports: None,
            server_reachable,
        }
    }
}
