use crate::error::{GeotagError, Result};
use crate::models::OverridePolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Google reverse geocoding endpoint
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for geotag
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub api_key: ConfigValue<Option<String>>,
    pub endpoint: ConfigValue<String>,
    pub language: ConfigValue<String>,
    pub timeout_secs: ConfigValue<u64>,
    pub max_retries: ConfigValue<u32>,
    pub fields: ConfigValue<Vec<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            api_key: ConfigValue::new(None, ConfigSource::Default),
            endpoint: ConfigValue::new(DEFAULT_ENDPOINT.to_string(), ConfigSource::Default),
            language: ConfigValue::new("en".to_string(), ConfigSource::Default),
            timeout_secs: ConfigValue::new(15, ConfigSource::Default),
            max_retries: ConfigValue::new(2, ConfigSource::Default),
            fields: ConfigValue::new(Vec::new(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeotagError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeotagError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(api_key) = file_config.api_key {
            self.api_key.update(Some(api_key), ConfigSource::File);
        }

        if let Some(endpoint) = file_config.endpoint {
            self.endpoint.update(endpoint, ConfigSource::File);
        }

        if let Some(language) = file_config.language {
            self.language.update(language, ConfigSource::File);
        }

        if let Some(timeout_secs) = file_config.timeout_secs {
            self.timeout_secs.update(timeout_secs, ConfigSource::File);
        }

        if let Some(max_retries) = file_config.max_retries {
            self.max_retries.update(max_retries, ConfigSource::File);
        }

        if let Some(fields) = file_config.fields {
            OverridePolicy::from_controls(&fields)?;
            self.fields.update(fields, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOTAG_API_KEY
        if let Ok(api_key) = env::var("GEOTAG_API_KEY") {
            if !api_key.trim().is_empty() {
                self.api_key.update(Some(api_key), ConfigSource::Environment);
            }
        }

        // GEOTAG_ENDPOINT
        if let Ok(endpoint) = env::var("GEOTAG_ENDPOINT") {
            self.endpoint.update(endpoint, ConfigSource::Environment);
        }

        // GEOTAG_LANGUAGE
        if let Ok(language) = env::var("GEOTAG_LANGUAGE") {
            self.language.update(language, ConfigSource::Environment);
        }

        // GEOTAG_TIMEOUT_SECS
        if let Ok(timeout_str) = env::var("GEOTAG_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOTAG_TIMEOUT_SECS value '{}': expected whole seconds",
                    timeout_str
                ),
            }
        }

        // GEOTAG_MAX_RETRIES
        if let Ok(retries_str) = env::var("GEOTAG_MAX_RETRIES") {
            match retries_str.parse::<u32>() {
                Ok(retries) => self.max_retries.update(retries, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOTAG_MAX_RETRIES value '{}': expected non-negative integer",
                    retries_str
                ),
            }
        }

        // GEOTAG_FIELDS
        if let Ok(fields_str) = env::var("GEOTAG_FIELDS") {
            match parse_field_list(&fields_str) {
                Ok(fields) => self.fields.update(fields, ConfigSource::Environment),
                Err(e) => tracing::warn!("Invalid GEOTAG_FIELDS value '{}': {}", fields_str, e),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(api_key) = overrides.api_key {
            self.api_key.update(Some(api_key), ConfigSource::Cli);
        }

        if let Some(language) = overrides.language {
            self.language.update(language, ConfigSource::Cli);
        }

        if let Some(fields) = overrides.fields {
            self.fields.update(fields, ConfigSource::Cli);
        }
    }

    /// Override policy described by the `fields` setting
    pub fn override_policy(&self) -> Result<OverridePolicy> {
        OverridePolicy::from_controls(&self.fields.value)
    }

    /// API key for the geocoder; `ConfigMissing` when no layer set one
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .value
            .as_deref()
            .ok_or_else(|| GeotagError::ConfigMissing { key: "api_key".to_string() })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        let api_key = match &self.api_key.value {
            Some(key) => mask_secret(key),
            None => "(not set)".to_string(),
        };
        map.insert("api_key".to_string(), (api_key, self.api_key.source));

        map.insert("endpoint".to_string(), (self.endpoint.value.clone(), self.endpoint.source));

        map.insert("language".to_string(), (self.language.value.clone(), self.language.source));

        map.insert(
            "timeout_secs".to_string(),
            (self.timeout_secs.value.to_string(), self.timeout_secs.source),
        );

        map.insert(
            "max_retries".to_string(),
            (self.max_retries.value.to_string(), self.max_retries.source),
        );

        let fields = if self.fields.value.is_empty() {
            "(fill empty only)".to_string()
        } else {
            self.fields.value.join(",")
        };
        map.insert("fields".to_string(), (fields, self.fields.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    api_key: Option<String>,
    endpoint: Option<String>,
    language: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    fields: Option<Vec<String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub fields: Option<Vec<String>>,
}

/// Parse a comma separated list of field controls
pub fn parse_field_list(s: &str) -> Result<Vec<String>> {
    let fields: Vec<String> = s
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect();
    OverridePolicy::from_controls(&fields)?;
    Ok(fields)
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", visible)
    }
}
