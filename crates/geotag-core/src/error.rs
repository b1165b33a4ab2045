//! Error types for geotag

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Axis;

#[derive(Debug, Error)]
pub enum GeotagError {
    // Coordinate errors
    #[error("Malformed {axis} coordinate '{value}': {reason}")]
    MalformedCoordinate {
        value: String,
        axis: Axis,
        reason: String,
    },

    #[error("No coordinates available for {id}")]
    MissingSourceData { id: String },

    // Collaborator errors
    #[error("Geocode provider {provider} failed: {reason}")]
    ProviderError { provider: String, reason: String },

    #[error("Catalog unavailable at {path}: {reason}")]
    CatalogUnavailable { path: PathBuf, reason: String },

    #[error("Cannot read sidecar {path}: {reason}")]
    UnreadableSource { path: PathBuf, reason: String },

    #[error("Cannot write sidecar {path}: {reason}")]
    WriteDenied { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeotagError {
    /// Whether this error only affects a single coordinate value
    pub fn is_coordinate_error(&self) -> bool {
        matches!(self, GeotagError::MalformedCoordinate { .. })
    }
}

pub type Result<T> = std::result::Result<T, GeotagError>;
