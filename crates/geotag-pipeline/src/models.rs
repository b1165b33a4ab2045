use chrono::{DateTime, Utc};
use geotag_core::models::{Axis, LocationField, LocationFieldSet};
use geotag_geo::{CacheStats, FieldSource};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A place field that received a new value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: LocationField,
    pub before: String,
    pub after: String,
    pub source: FieldSource,
}

/// A coordinate filled from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinateChange {
    pub axis: Axis,
    pub before: String,
    pub after: String,
}

/// What happened when the catalog was consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CatalogStatus {
    NotConfigured,
    Found,
    NotFound,
    Unavailable { reason: String },
}

/// What happened when the geocoder was (or was not) consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeocodeStatus {
    /// Every field was already filled
    NotNeeded,
    /// No geocoder configured
    Disabled,
    /// The record has no coordinate pair to look up
    MissingCoordinates,
    /// A coordinate could not be parsed; see `coordinate_errors`
    InvalidCoordinates,
    CacheHit,
    Resolved,
    Failed { reason: String },
}

impl CatalogStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogStatus::NotConfigured => "not configured",
            CatalogStatus::Found => "found",
            CatalogStatus::NotFound => "not found",
            CatalogStatus::Unavailable { .. } => "unavailable",
        }
    }
}

impl GeocodeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GeocodeStatus::NotNeeded => "not needed",
            GeocodeStatus::Disabled => "disabled",
            GeocodeStatus::MissingCoordinates => "no coordinates",
            GeocodeStatus::InvalidCoordinates => "invalid coordinates",
            GeocodeStatus::CacheHit => "cache hit",
            GeocodeStatus::Resolved => "resolved",
            GeocodeStatus::Failed { .. } => "failed",
        }
    }
}

/// Result of enriching one sidecar
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub path: PathBuf,
    pub base_name: String,
    pub field_changes: Vec<FieldChange>,
    pub coordinate_changes: Vec<CoordinateChange>,
    pub catalog: CatalogStatus,
    pub geocode: GeocodeStatus,
    /// Malformed coordinate messages; they never abort the record
    pub coordinate_errors: Vec<String>,
    /// Field values after reconciliation
    pub fields: LocationFieldSet,
    pub written: bool,
}

impl RecordOutcome {
    pub fn new(path: &Path, base_name: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            base_name: base_name.into(),
            field_changes: Vec::new(),
            coordinate_changes: Vec::new(),
            catalog: CatalogStatus::NotConfigured,
            geocode: GeocodeStatus::NotNeeded,
            coordinate_errors: Vec::new(),
            fields: LocationFieldSet::new(),
            written: false,
        }
    }

    /// Whether anything differs from the sidecar as read
    pub fn has_changes(&self) -> bool {
        !self.field_changes.is_empty() || !self.coordinate_changes.is_empty()
    }
}

/// A record that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct RecordFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Totals of one enrichment run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub processed: usize,
    /// Records with changes, written or (in a dry run) planned
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub provider_calls: u64,
    pub cache: CacheStats,
    pub records: Vec<RecordOutcome>,
    pub failures: Vec<RecordFailure>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            processed: 0,
            updated: 0,
            unchanged: 0,
            failed: 0,
            provider_calls: 0,
            cache: CacheStats::default(),
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: RecordOutcome) {
        self.processed += 1;
        if outcome.has_changes() {
            self.updated += 1;
        } else {
            self.unchanged += 1;
        }
        self.records.push(outcome);
    }

    pub fn record_failure(&mut self, path: &Path, error: impl ToString) {
        self.processed += 1;
        self.failed += 1;
        self.failures.push(RecordFailure { path: path.to_path_buf(), error: error.to_string() });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Wall-clock duration, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::new();

        let unchanged = RecordOutcome::new(Path::new("a.xmp"), "a");
        let mut updated = RecordOutcome::new(Path::new("b.xmp"), "b");
        updated.field_changes.push(FieldChange {
            field: LocationField::City,
            before: String::new(),
            after: "Minato-ku".to_string(),
            source: FieldSource::Geocode,
        });

        summary.record(unchanged);
        summary.record(updated);
        summary.record_failure(Path::new("c.xmp"), "Cannot read sidecar");
        summary.finish();

        assert_eq!((summary.processed, summary.updated, summary.unchanged, summary.failed), (3, 1, 1, 1));
        assert!(summary.has_failures());
        assert!(summary.duration().is_some());
    }

    #[test]
    fn test_status_serialization() {
        let status = GeocodeStatus::Failed { reason: "REQUEST_DENIED".to_string() };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "REQUEST_DENIED");

        let json = serde_json::to_value(CatalogStatus::NotConfigured).unwrap();
        assert_eq!(json["status"], "not_configured");
    }
}
