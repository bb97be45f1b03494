//! Station configuration loading: central server location, event code and queue file.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::central::CentralConfig;

/// Default location on disk where the station looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/station.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOUT_RELAY_CONFIG_PATH";
const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
const DEFAULT_EVENT_CODE: &str = "DEMO";
const DEFAULT_QUEUE_PATH: &str = "data/saved_scores.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the station.
pub struct AppConfig {
    server_url: String,
    event_code: String,
    queue_path: PathBuf,
    request_timeout: Duration,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        Self::load_from(resolve_config_path())
    }

    fn load_from(path: PathBuf) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        server_url = %app_config.server_url,
                        event_code = %app_config.event_code,
                        "loaded station config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Base URL of the central scoring server.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Event code stamped on every report this station captures.
    pub fn event_code(&self) -> &str {
        &self.event_code
    }

    /// Location of the saved scores file.
    pub fn queue_path(&self) -> &PathBuf {
        &self.queue_path
    }

    /// Per-request timeout for central server calls.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Settings for the central server client.
    pub fn central(&self) -> CentralConfig {
        CentralConfig::new(self.server_url.clone())
            .with_timeout(self.request_timeout)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    server_url: String,
    event_code: String,
    queue_path: PathBuf,
    request_timeout_secs: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            event_code: DEFAULT_EVENT_CODE.into(),
            queue_path: PathBuf::from(DEFAULT_QUEUE_PATH),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let request_timeout_secs = if value.request_timeout_secs == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECS
        } else {
            value.request_timeout_secs
        };
        Self {
            server_url: value.server_url,
            event_code: value.event_code,
            queue_path: value.queue_path,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
