//! CLI configuration from environment.

use std::env;
use std::time::Duration;
use waypath_elevation::{OpenTopoConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone)]
pub struct Config {
    pub elevation_url: String,
    pub http_timeout_s: u64,
    /// Attempts per elevation chunk; `None` retries until the service answers.
    pub elevation_max_attempts: Option<u32>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            elevation_url: env::var("WAYPATH_ELEVATION_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            http_timeout_s: env::var("WAYPATH_HTTP_TIMEOUT_S")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            elevation_max_attempts: env::var("WAYPATH_ELEVATION_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn elevation_client_config(&self) -> OpenTopoConfig {
        OpenTopoConfig {
            base_url: self.elevation_url.clone(),
            timeout: Duration::from_secs(self.http_timeout_s.max(1)),
        }
    }
}
