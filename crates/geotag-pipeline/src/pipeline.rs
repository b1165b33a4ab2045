use geotag_core::error::{GeotagError, Result};
use geotag_core::models::{Axis, CatalogRow, CoordinatePair, LocationFieldSet, OverridePolicy};
use geotag_core::ports::{MetadataReader, MetadataWriter};
use geotag_geo::{parse_coordinate, reconcile, reconcile_coordinate, select_fields, LookupCache};
use geotag_geocode::GeocodeProvider;
use geotag_store::CatalogLookup;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{
    CatalogStatus, CoordinateChange, FieldChange, GeocodeStatus, RecordOutcome, RunSummary,
};

/// Enrichment pipeline sequencing sidecar, catalog and geocoder
///
/// Records are processed one at a time. The lookup cache lives as long as the
/// pipeline, so one pipeline should be used per run.
pub struct EnrichmentPipeline<R, W, C, G>
where
    R: MetadataReader,
    W: MetadataWriter,
    C: CatalogLookup,
    G: GeocodeProvider,
{
    reader: R,
    writer: W,
    catalog: Option<C>,
    geocoder: Option<G>,
    policy: OverridePolicy,
    cache: LookupCache,
    provider_calls: u64,
    dry_run: bool,
}

impl<R, W, C, G> EnrichmentPipeline<R, W, C, G>
where
    R: MetadataReader,
    W: MetadataWriter,
    C: CatalogLookup,
    G: GeocodeProvider,
{
    /// Create a new enrichment pipeline
    pub fn new(
        reader: R,
        writer: W,
        catalog: Option<C>,
        geocoder: Option<G>,
        policy: OverridePolicy,
    ) -> Self {
        Self {
            reader,
            writer,
            catalog,
            geocoder,
            policy,
            cache: LookupCache::new(),
            provider_calls: 0,
            dry_run: false,
        }
    }

    /// Plan changes without writing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn policy(&self) -> &OverridePolicy {
        &self.policy
    }

    pub fn catalog(&self) -> Option<&C> {
        self.catalog.as_ref()
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub fn provider_calls(&self) -> u64 {
        self.provider_calls
    }

    /// Process sidecars in order, collecting failures instead of stopping
    pub async fn run(&mut self, paths: &[PathBuf]) -> RunSummary {
        let mut summary = RunSummary::new();
        info!(records = paths.len(), dry_run = self.dry_run, "Starting enrichment run");

        for path in paths {
            match self.process(path).await {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Record failed");
                    summary.record_failure(path, e);
                }
            }
        }

        summary.provider_calls = self.provider_calls;
        summary.cache = self.cache.stats();
        summary.finish();

        info!(
            processed = summary.processed,
            updated = summary.updated,
            failed = summary.failed,
            provider_calls = summary.provider_calls,
            "Enrichment run finished"
        );
        summary
    }

    /// Enrich one sidecar
    ///
    /// Fails only when the sidecar cannot be read or written. Catalog and
    /// provider problems are reported in the outcome.
    pub async fn process(&mut self, path: &Path) -> Result<RecordOutcome> {
        let record = self.reader.read(path).await?;
        let base_name = record.base_name();
        info!(path = %path.display(), base_name = %base_name, "Processing sidecar");

        let mut outcome = RecordOutcome::new(path, base_name.as_str());
        let catalog_row = self.lookup_catalog(&base_name, &mut outcome).await;

        // Coordinates are only ever filled, from the catalog
        let mut latitude = record.latitude.clone();
        let mut longitude = record.longitude.clone();
        if let Some(row) = &catalog_row {
            for axis in [Axis::Latitude, Axis::Longitude] {
                match reconcile_coordinate(record.coordinate(axis), row.coordinate(axis), axis) {
                    Ok(Some(value)) => {
                        outcome.coordinate_changes.push(CoordinateChange {
                            axis,
                            before: String::new(),
                            after: value.clone(),
                        });
                        match axis {
                            Axis::Latitude => latitude = value,
                            Axis::Longitude => longitude = value,
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Catalog coordinate rejected");
                        outcome.coordinate_errors.push(e.to_string());
                    }
                }
            }
        }

        let catalog_fields = catalog_row.as_ref().map(|row| &row.fields);
        let interim = reconcile(&record.fields, catalog_fields, None, &self.policy);

        let geocode_fields = if interim.fields.has_unset() {
            self.lookup_geocode(&base_name, &latitude, &longitude, &mut outcome).await
        } else {
            debug!(base_name = %base_name, "All fields set; geocoder not needed");
            outcome.geocode = GeocodeStatus::NotNeeded;
            None
        };

        let result = reconcile(&record.fields, catalog_fields, geocode_fields.as_ref(), &self.policy);
        outcome.field_changes = result
            .changes()
            .filter_map(|o| {
                o.source.map(|source| FieldChange {
                    field: o.field,
                    before: o.before.clone(),
                    after: o.after.clone(),
                    source,
                })
            })
            .collect();
        outcome.fields = result.fields;

        if !outcome.has_changes() {
            debug!(path = %path.display(), "Nothing to update");
        } else if self.dry_run {
            info!(path = %path.display(), changes = outcome.field_changes.len(), "Dry run; not writing");
        } else {
            self.writer.write(path, &outcome.fields, &latitude, &longitude).await?;
            outcome.written = true;
            info!(path = %path.display(), changes = outcome.field_changes.len(), "Sidecar updated");
        }

        Ok(outcome)
    }

    async fn lookup_catalog(&self, base_name: &str, outcome: &mut RecordOutcome) -> Option<CatalogRow> {
        let Some(catalog) = &self.catalog else {
            outcome.catalog = CatalogStatus::NotConfigured;
            return None;
        };

        match catalog.find_by_base_name(base_name).await {
            Ok(Some(row)) => {
                outcome.catalog = CatalogStatus::Found;
                Some(row)
            }
            Ok(None) => {
                outcome.catalog = CatalogStatus::NotFound;
                None
            }
            Err(e) => {
                warn!(base_name, error = %e, "Catalog unavailable; continuing without it");
                outcome.catalog = CatalogStatus::Unavailable { reason: e.to_string() };
                None
            }
        }
    }

    async fn lookup_geocode(
        &mut self,
        base_name: &str,
        latitude: &str,
        longitude: &str,
        outcome: &mut RecordOutcome,
    ) -> Option<LocationFieldSet> {
        let Some(geocoder) = &self.geocoder else {
            outcome.geocode = GeocodeStatus::Disabled;
            return None;
        };

        let pair = match coordinate_pair(base_name, latitude, longitude) {
            Ok(pair) => pair,
            Err(errors) => {
                if errors.iter().any(GeotagError::is_coordinate_error) {
                    for e in &errors {
                        warn!(base_name, error = %e, "Malformed sidecar coordinate");
                    }
                    outcome.coordinate_errors.extend(errors.iter().map(|e| e.to_string()));
                    outcome.geocode = GeocodeStatus::InvalidCoordinates;
                } else {
                    debug!(base_name, "No coordinates; skipping geocoder");
                    outcome.geocode = GeocodeStatus::MissingCoordinates;
                }
                return None;
            }
        };

        if let Some(fields) = self.cache.get(pair) {
            debug!(base_name, %pair, "Geocode cache hit");
            outcome.geocode = GeocodeStatus::CacheHit;
            return Some(fields.clone());
        }

        self.provider_calls += 1;
        match geocoder.reverse_geocode(pair).await {
            Ok(response) => {
                let fields = select_fields(&response);
                self.cache.put(pair, fields.clone());
                outcome.geocode = GeocodeStatus::Resolved;
                Some(fields)
            }
            Err(e) => {
                warn!(base_name, provider = geocoder.name(), error = %e, "Reverse geocode failed");
                outcome.geocode = GeocodeStatus::Failed { reason: e.to_string() };
                None
            }
        }
    }
}

/// Parse the sidecar coordinate pair, collecting every error
fn coordinate_pair(
    base_name: &str,
    latitude: &str,
    longitude: &str,
) -> std::result::Result<CoordinatePair, Vec<GeotagError>> {
    if latitude.is_empty() || longitude.is_empty() {
        return Err(vec![GeotagError::MissingSourceData { id: base_name.to_string() }]);
    }

    match (
        parse_coordinate(latitude, Axis::Latitude),
        parse_coordinate(longitude, Axis::Longitude),
    ) {
        (Ok(lat), Ok(lng)) => Ok(CoordinatePair::new(lat, lng)),
        (lat, lng) => Err([lat.err(), lng.err()].into_iter().flatten().collect()),
    }
}
