use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Axis, LocationFieldSet};

/// One sidecar file being enriched
///
/// Coordinates are kept in the string form found in the file (usually
/// hemisphere-tagged); an empty string means the file carries no value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub path: PathBuf,
    pub latitude: String,
    pub longitude: String,
    pub fields: LocationFieldSet,
}

impl MetadataRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// File name without extension, used as the catalog key
    pub fn base_name(&self) -> String {
        base_name(&self.path)
    }

    pub fn coordinate(&self, axis: Axis) -> &str {
        match axis {
            Axis::Latitude => &self.latitude,
            Axis::Longitude => &self.longitude,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        !self.latitude.is_empty() || !self.longitude.is_empty()
    }
}

/// A row of the external catalog describing the same image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub base_name: String,
    /// Signed decimal degrees
    pub latitude: Option<f64>,
    /// Signed decimal degrees
    pub longitude: Option<f64>,
    pub fields: LocationFieldSet,
}

impl CatalogRow {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self { base_name: base_name.into(), ..Default::default() }
    }

    pub fn coordinate(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }
}

/// File stem of `path` as a lossy string
pub fn base_name(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}
