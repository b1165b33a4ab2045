//! Google Geocoding API adapter
//!
//! Wire status `OK` maps to entries in document order and `ZERO_RESULTS` to
//! an empty response. Rate limiting and server-side failures are retried
//! with a linear backoff.

use async_trait::async_trait;
use geotag_core::config::DEFAULT_ENDPOINT;
use geotag_core::error::{GeotagError, Result};
use geotag_core::models::{AddressComponent, CoordinatePair, GeocodeEntry, GeocodeResponse};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::GeocodeProvider;

pub const PROVIDER: &str = "google";
const USER_AGENT: &str = concat!("geotag/", env!("CARGO_PKG_VERSION"));
const BASE_BACKOFF_MS: u64 = 250;

/// Settings for the Google adapter
#[derive(Debug, Clone)]
pub struct GoogleGeocoderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub language: String,
    pub timeout: Duration,
    /// Extra attempts after the first one for transient failures
    pub max_retries: u32,
}

impl Default for GoogleGeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            language: "en".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 2,
        }
    }
}

/// Reverse geocoder backed by the Google Geocoding API
pub struct GoogleGeocoder {
    config: GoogleGeocoderConfig,
    client: reqwest::Client,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleGeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| provider_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GoogleGeocoderConfig {
        &self.config
    }

    fn request_url(&self, coordinate: CoordinatePair) -> Result<reqwest::Url> {
        let mut params = vec![
            ("latlng", coordinate.to_string()),
            ("language", self.config.language.clone()),
        ];
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }

        reqwest::Url::parse_with_params(&self.config.endpoint, &params).map_err(|e| {
            GeotagError::ConfigInvalid {
                key: "endpoint".to_string(),
                reason: format!("'{}' is not a valid URL: {}", self.config.endpoint, e),
            }
        })
    }

    async fn lookup_once(&self, url: reqwest::Url) -> std::result::Result<GeocodeResponse, Failure> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = format!("Request failed: {}", e);
            if e.is_timeout() || e.is_connect() {
                Failure::Transient(reason)
            } else {
                Failure::Fatal(reason)
            }
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Failure::Transient(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Failure::Fatal(format!("HTTP {}: {}", status, body)));
        }

        let wire = response.json::<WireResponse>().await.map_err(|e| {
            if e.is_decode() {
                Failure::Fatal(format!("Failed to parse response: {}", e))
            } else {
                Failure::Transient(format!("Failed to read response: {}", e))
            }
        })?;

        interpret(wire)
    }
}

#[async_trait]
impl GeocodeProvider for GoogleGeocoder {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn reverse_geocode(&self, coordinate: CoordinatePair) -> Result<GeocodeResponse> {
        let url = self.request_url(coordinate)?;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.lookup_once(url.clone()).await {
                Ok(response) => {
                    debug!(%coordinate, entries = response.entries.len(), attempt, "Reverse geocode succeeded");
                    return Ok(response);
                }
                Err(Failure::Transient(reason)) if attempt <= self.config.max_retries => {
                    let delay = Duration::from_millis(BASE_BACKOFF_MS * u64::from(attempt));
                    warn!(%coordinate, attempt, reason = %reason, "Reverse geocode failed; retrying after {:?}", delay);
                    sleep(delay).await;
                }
                Err(Failure::Transient(reason)) | Err(Failure::Fatal(reason)) => {
                    return Err(provider_error(reason));
                }
            }
        }
    }
}

/// Outcome of one failed attempt
#[derive(Debug)]
enum Failure {
    Transient(String),
    Fatal(String),
}

/// Map a Geocoding API JSON body into the provider-agnostic response
pub fn parse_response(body: &str) -> Result<GeocodeResponse> {
    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|e| provider_error(format!("Failed to parse response: {}", e)))?;

    interpret(wire).map_err(|failure| match failure {
        Failure::Transient(reason) | Failure::Fatal(reason) => provider_error(reason),
    })
}

fn interpret(wire: WireResponse) -> std::result::Result<GeocodeResponse, Failure> {
    let describe = |wire: &WireResponse| match &wire.error_message {
        Some(message) => format!("{}: {}", wire.status, message),
        None => wire.status.clone(),
    };

    match wire.status.as_str() {
        "OK" => Ok(GeocodeResponse::new(wire.results.into_iter().map(Into::into).collect())),
        "ZERO_RESULTS" => Ok(GeocodeResponse::default()),
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => Err(Failure::Transient(describe(&wire))),
        _ => Err(Failure::Fatal(describe(&wire))),
    }
}

fn provider_error(reason: String) -> GeotagError {
    GeotagError::ProviderError { provider: PROVIDER.to_string(), reason }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<WireResult>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    address_components: Vec<WireComponent>,
}

#[derive(Debug, Deserialize)]
struct WireComponent {
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    short_name: String,
    #[serde(default)]
    long_name: String,
}

impl From<WireResult> for GeocodeEntry {
    fn from(result: WireResult) -> Self {
        GeocodeEntry {
            types: result.types,
            components: result.address_components.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<WireComponent> for AddressComponent {
    fn from(component: WireComponent) -> Self {
        AddressComponent {
            types: component.types,
            short_name: component.short_name,
            long_name: component.long_name,
        }
    }
}
