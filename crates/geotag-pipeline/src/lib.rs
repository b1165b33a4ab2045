//! Geotag Pipeline - Per-record enrichment orchestration
//!
//! The pipeline reads a sidecar, consults the catalog and the geocoder as
//! needed, reconciles the candidates and writes the result back. All decision
//! rules live in `geotag-geo`.

pub mod models;
pub mod pipeline;

pub use models::{
    CatalogStatus, CoordinateChange, FieldChange, GeocodeStatus, RecordFailure, RecordOutcome,
    RunSummary,
};
pub use pipeline::EnrichmentPipeline;
