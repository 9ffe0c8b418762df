//! Blocking HTTP client for OpenTopoData-compatible elevation APIs.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use waypath_core::{ElevationError, ElevationProvider, ElevationSample};

/// Public OpenTopoData endpoint serving the Mapzen dataset.
pub const DEFAULT_BASE_URL: &str = "https://api.opentopodata.org/v1/mapzen";

#[derive(Debug, Clone)]
pub struct OpenTopoConfig {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OpenTopoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for an OpenTopoData elevation dataset.
pub struct OpenTopoClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

#[derive(Debug, Deserialize)]
struct OpenTopoResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    results: Option<Vec<OpenTopoResult>>,
}

#[derive(Debug, Deserialize)]
struct OpenTopoResult {
    elevation: Option<f64>,
    location: OpenTopoLocation,
}

#[derive(Debug, Deserialize)]
struct OpenTopoLocation {
    lat: f64,
    lng: f64,
}

impl OpenTopoClient {
    /// Create a new client.
    pub fn new(config: OpenTopoConfig) -> Result<Self, ElevationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("waypath/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ElevationError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches(['?', '/']).to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ElevationProvider for OpenTopoClient {
    fn lookup(&self, locations: &[(f64, f64)]) -> Result<Vec<ElevationSample>, ElevationError> {
        tracing::debug!("Requesting elevation for {} locations", locations.len());
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("locations", locations_param(locations))])
            .send()
            .map_err(|err| ElevationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Elevation provider HTTP {}", status);
            return Err(ElevationError::Status(status.as_u16()));
        }

        let payload: OpenTopoResponse = response
            .json()
            .map_err(|err| ElevationError::Decode(err.to_string()))?;
        decode_samples(payload)
    }
}

/// `lat,lon|lat,lon|...` from `(lon, lat)` pairs. `{}` formatting of `f64`
/// is the shortest round-trip form, so the echoed location parses back to
/// the same bits.
fn locations_param(locations: &[(f64, f64)]) -> String {
    let mut buf = String::new();
    for (idx, (lng, lat)) in locations.iter().enumerate() {
        if idx > 0 {
            buf.push('|');
        }
        buf.push_str(&format!("{},{}", lat, lng));
    }
    buf
}

fn decode_samples(payload: OpenTopoResponse) -> Result<Vec<ElevationSample>, ElevationError> {
    let results = payload.results.ok_or_else(|| {
        ElevationError::Decode(format!(
            "missing results (status {}, error {})",
            payload.status.as_deref().unwrap_or("unknown"),
            payload.error.as_deref().unwrap_or("none")
        ))
    })?;

    results
        .into_iter()
        .map(|result| {
            let elevation = result.elevation.ok_or_else(|| {
                ElevationError::Decode(format!(
                    "no elevation for ({}, {})",
                    result.location.lng, result.location.lat
                ))
            })?;
            Ok(ElevationSample {
                lng: result.location.lng,
                lat: result.location.lat,
                elevation,
            })
        })
        .collect()
}
