use std::time::Duration;

/// How to reach the central scoring server.
#[derive(Debug, Clone)]
pub struct CentralConfig {
    /// Server root, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Upper bound for any single request.
    pub request_timeout: Duration,
}

impl CentralConfig {
    /// Construct a configuration for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
