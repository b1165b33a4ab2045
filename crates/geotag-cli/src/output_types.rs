use geotag_pipeline::{FieldChange, RecordOutcome, RunSummary};
use serde::Serialize;
use tabled::Tabled;

/// One row of the per-record change table
#[derive(Debug, Tabled)]
pub struct FieldChangeRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Before")]
    pub before: String,
    #[tabled(rename = "After")]
    pub after: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl From<&FieldChange> for FieldChangeRow {
    fn from(change: &FieldChange) -> Self {
        Self {
            field: change.field.to_string(),
            before: display_value(&change.before),
            after: change.after.clone(),
            source: change.source.to_string(),
        }
    }
}

/// One row of the run overview
#[derive(Debug, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "Sidecar")]
    pub base_name: String,
    #[tabled(rename = "Catalog")]
    pub catalog: String,
    #[tabled(rename = "Geocoder")]
    pub geocode: String,
    #[tabled(rename = "Changes")]
    pub changes: usize,
    #[tabled(rename = "Written")]
    pub written: String,
}

impl From<&RecordOutcome> for RecordRow {
    fn from(outcome: &RecordOutcome) -> Self {
        Self {
            base_name: outcome.base_name.clone(),
            catalog: outcome.catalog.label().to_string(),
            geocode: outcome.geocode.label().to_string(),
            changes: outcome.field_changes.len() + outcome.coordinate_changes.len(),
            written: if outcome.written { "yes" } else { "no" }.to_string(),
        }
    }
}

/// Effective configuration entry
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Output for the convert command
#[derive(Debug, Serialize)]
pub struct ConvertOutput {
    pub axis: String,
    pub input: String,
    pub hemisphere_tagged: String,
    pub decimal: f64,
}

/// Output for the enrich command
#[derive(Debug, Serialize)]
pub struct EnrichOutput<'a> {
    pub dry_run: bool,
    pub summary: &'a RunSummary,
}

fn display_value(value: &str) -> String {
    if value.is_empty() {
        "(empty)".to_string()
    } else {
        value.to_string()
    }
}
