//! Integration tests for the enrichment pipeline
//!
//! Sidecars are real XMP files in a temporary folder; the catalog and the
//! geocoder are in-memory stand-ins.

use async_trait::async_trait;
use geotag_core::formats::XmpSidecar;
use geotag_core::models::{
    AddressComponent, CatalogRow, CoordinatePair, GeocodeEntry, GeocodeResponse, LocationField,
    LocationFieldSet, OverridePolicy,
};
use geotag_core::ports::{MetadataReader, MetadataWriter};
use geotag_core::{GeotagError, Result};
use geotag_geo::FieldSource;
use geotag_geocode::GeocodeProvider;
use geotag_pipeline::{CatalogStatus, EnrichmentPipeline, GeocodeStatus};
use geotag_store::{CatalogLookup, MemoryCatalog};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct StubGeocoder {
    response: GeocodeResponse,
    calls: Arc<AtomicUsize>,
}

impl StubGeocoder {
    fn minato() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = GeocodeResponse::new(vec![GeocodeEntry::new(
            &["premise"],
            vec![
                AddressComponent::new(&["sublocality_level_1"], "Roppongi", "Roppongi"),
                AddressComponent::new(&["locality"], "Minato-ku", "Minato-ku"),
                AddressComponent::new(&["administrative_area_level_1"], "Tokyo", "Tokyo"),
                AddressComponent::new(&["country"], "JP", "Japan"),
            ],
        )]);
        (Self { response, calls: calls.clone() }, calls)
    }
}

#[async_trait]
impl GeocodeProvider for StubGeocoder {
    fn name(&self) -> &str {
        "stub"
    }

    async fn reverse_geocode(&self, _coordinate: CoordinatePair) -> Result<GeocodeResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

struct FailingGeocoder;

#[async_trait]
impl GeocodeProvider for FailingGeocoder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn reverse_geocode(&self, _coordinate: CoordinatePair) -> Result<GeocodeResponse> {
        Err(GeotagError::ProviderError {
            provider: "failing".to_string(),
            reason: "REQUEST_DENIED".to_string(),
        })
    }
}

struct UnavailableCatalog;

#[async_trait]
impl CatalogLookup for UnavailableCatalog {
    async fn find_by_base_name(&self, _name: &str) -> Result<Option<CatalogRow>> {
        Err(GeotagError::CatalogUnavailable {
            path: PathBuf::from("Photos.lrcat"),
            reason: "database is locked".to_string(),
        })
    }
}

/// Refuses to write one path and writes everything else as XMP
struct DenyingWriter {
    denied: PathBuf,
}

#[async_trait]
impl MetadataWriter for DenyingWriter {
    async fn write(
        &self,
        path: &Path,
        fields: &LocationFieldSet,
        latitude: &str,
        longitude: &str,
    ) -> Result<()> {
        if path == self.denied {
            return Err(GeotagError::WriteDenied {
                path: path.to_path_buf(),
                reason: "Permission denied".to_string(),
            });
        }
        XmpSidecar.write(path, fields, latitude, longitude).await
    }
}

/// Write a sidecar carrying only the non-empty properties given
fn write_sidecar(dir: &Path, name: &str, properties: &[(&str, &str)]) -> PathBuf {
    let attributes: String = properties
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("\n    {}=\"{}\"", key, value))
        .collect();

    let content = format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:exif="http://ns.adobe.com/exif/1.0/"
    xmlns:photoshop="http://ns.adobe.com/photoshop/1.0/"
    xmlns:Iptc4xmpCore="http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/"{}/>
 </rdf:RDF>
</x:xmpmeta>
"#,
        attributes
    );

    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn tokyo_catalog() -> MemoryCatalog {
    let mut row = CatalogRow::new("XT1R3587");
    row.fields.set(LocationField::City, "Minato-ku");
    row.fields.set(LocationField::State, "Osaka");
    MemoryCatalog::new().with_row(row)
}

const LAT: &str = "35,40.0153533333N";
const LNG: &str = "139,44.7859366667E";

#[tokio::test]
async fn test_fill_only_from_catalog() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(dir.path(), "XT1R3587.xmp", &[("photoshop:State", "Tokyo")]);

    let mut pipeline = EnrichmentPipeline::<_, _, _, StubGeocoder>::new(
        XmpSidecar,
        XmpSidecar,
        Some(tokyo_catalog()),
        None,
        OverridePolicy::default(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    assert_eq!(outcome.catalog, CatalogStatus::Found);
    assert_eq!(outcome.geocode, GeocodeStatus::Disabled);
    assert_eq!(outcome.fields.city, "Minato-ku");
    assert_eq!(outcome.fields.state, "Tokyo");
    assert!(outcome.written);

    let record = XmpSidecar.read(&path).await.unwrap();
    assert_eq!(record.fields.city, "Minato-ku");
    assert_eq!(record.fields.state, "Tokyo");
}

#[tokio::test]
async fn test_selected_field_overwritten_from_catalog() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(dir.path(), "XT1R3587.xmp", &[("photoshop:State", "Tokyo")]);

    let mut pipeline = EnrichmentPipeline::<_, _, _, StubGeocoder>::new(
        XmpSidecar,
        XmpSidecar,
        Some(tokyo_catalog()),
        None,
        OverridePolicy::from_controls(["state"]).unwrap(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    let state = outcome.field_changes.iter().find(|c| c.field == LocationField::State).unwrap();
    assert_eq!((state.before.as_str(), state.after.as_str()), ("Tokyo", "Osaka"));
    assert_eq!(state.source, FieldSource::Catalog);
    assert_eq!(XmpSidecar.read(&path).await.unwrap().fields.state, "Osaka");
}

#[tokio::test]
async fn test_shared_coordinates_use_one_provider_call() {
    let dir = TempDir::new().unwrap();
    let first = write_sidecar(dir.path(), "a.xmp", &[("exif:GPSLatitude", LAT), ("exif:GPSLongitude", LNG)]);
    let second = write_sidecar(
        dir.path(),
        "b.xmp",
        &[("exif:GPSLatitude", "35.666922555555"), ("exif:GPSLongitude", "139.746432277778")],
    );

    let (geocoder, calls) = StubGeocoder::minato();
    let mut pipeline = EnrichmentPipeline::<_, _, MemoryCatalog, _>::new(
        XmpSidecar,
        XmpSidecar,
        None,
        Some(geocoder),
        OverridePolicy::default(),
    );
    let summary = pipeline.run(&[first, second.clone()]).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(summary.provider_calls, 1);
    assert_eq!(summary.cache.hits, 1);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.records[0].geocode, GeocodeStatus::Resolved);
    assert_eq!(summary.records[1].geocode, GeocodeStatus::CacheHit);

    let record = XmpSidecar.read(&second).await.unwrap();
    assert_eq!(record.fields.location, "Roppongi");
    assert_eq!(record.fields.country_code, "JP");
}

#[tokio::test]
async fn test_provider_failure_still_writes_catalog_values() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(
        dir.path(),
        "XT1R3587.xmp",
        &[("exif:GPSLatitude", LAT), ("exif:GPSLongitude", LNG)],
    );

    let mut pipeline = EnrichmentPipeline::new(
        XmpSidecar,
        XmpSidecar,
        Some(tokyo_catalog()),
        Some(FailingGeocoder),
        OverridePolicy::default(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    assert!(matches!(outcome.geocode, GeocodeStatus::Failed { .. }));
    assert!(outcome.written);
    let record = XmpSidecar.read(&path).await.unwrap();
    assert_eq!(record.fields.city, "Minato-ku");
    assert_eq!(record.fields.country, "");
}

#[tokio::test]
async fn test_unavailable_catalog_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(
        dir.path(),
        "XT1R3587.xmp",
        &[("exif:GPSLatitude", LAT), ("exif:GPSLongitude", LNG)],
    );

    let (geocoder, _) = StubGeocoder::minato();
    let mut pipeline = EnrichmentPipeline::new(
        XmpSidecar,
        XmpSidecar,
        Some(UnavailableCatalog),
        Some(geocoder),
        OverridePolicy::default(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    assert!(matches!(outcome.catalog, CatalogStatus::Unavailable { .. }));
    assert_eq!(outcome.geocode, GeocodeStatus::Resolved);
    assert_eq!(outcome.fields.city, "Minato-ku");
    assert!(outcome.field_changes.iter().all(|c| c.source == FieldSource::Geocode));
}

#[tokio::test]
async fn test_malformed_coordinate_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let bad = write_sidecar(
        dir.path(),
        "bad.xmp",
        &[("exif:GPSLatitude", "35,40.0E"), ("exif:GPSLongitude", LNG)],
    );
    let good = write_sidecar(dir.path(), "good.xmp", &[("exif:GPSLatitude", LAT), ("exif:GPSLongitude", LNG)]);

    let (geocoder, calls) = StubGeocoder::minato();
    let mut pipeline = EnrichmentPipeline::<_, _, MemoryCatalog, _>::new(
        XmpSidecar,
        XmpSidecar,
        None,
        Some(geocoder),
        OverridePolicy::default(),
    );
    let summary = pipeline.run(&[bad, good]).await;

    assert_eq!(summary.failed, 0);
    assert_eq!(summary.records[0].geocode, GeocodeStatus::InvalidCoordinates);
    assert_eq!(summary.records[0].coordinate_errors.len(), 1);
    assert!(summary.records[0].coordinate_errors[0].contains("35,40.0E"));
    assert!(!summary.records[0].written);
    assert!(summary.records[1].written);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_coordinates_filled_from_catalog() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(dir.path(), "XT1R3587.xmp", &[]);

    let mut row = CatalogRow::new("XT1R3587");
    row.latitude = Some(-35.666922555555);
    row.longitude = Some(139.746432277778);
    let (geocoder, calls) = StubGeocoder::minato();

    let mut pipeline = EnrichmentPipeline::new(
        XmpSidecar,
        XmpSidecar,
        Some(MemoryCatalog::new().with_row(row)),
        Some(geocoder),
        OverridePolicy::default(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    assert_eq!(outcome.coordinate_changes.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let record = XmpSidecar.read(&path).await.unwrap();
    assert_eq!(record.latitude, "35,40.0153533333S");
    assert_eq!(record.longitude, "139,44.7859366667E");
    assert_eq!(record.fields.state, "Tokyo");
}

#[tokio::test]
async fn test_missing_coordinates_skip_geocoder() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(dir.path(), "plain.xmp", &[]);

    let (geocoder, calls) = StubGeocoder::minato();
    let mut pipeline = EnrichmentPipeline::<_, _, MemoryCatalog, _>::new(
        XmpSidecar,
        XmpSidecar,
        None,
        Some(geocoder),
        OverridePolicy::default(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    assert_eq!(outcome.geocode, GeocodeStatus::MissingCoordinates);
    assert!(outcome.coordinate_errors.is_empty());
    assert!(!outcome.has_changes());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_dry_run_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(dir.path(), "XT1R3587.xmp", &[("exif:GPSLatitude", LAT), ("exif:GPSLongitude", LNG)]);
    let before = fs::read_to_string(&path).unwrap();

    let (geocoder, _) = StubGeocoder::minato();
    let mut pipeline = EnrichmentPipeline::<_, _, MemoryCatalog, _>::new(
        XmpSidecar,
        XmpSidecar,
        None,
        Some(geocoder),
        OverridePolicy::default(),
    )
    .with_dry_run(true);
    let outcome = pipeline.process(&path).await.unwrap();

    assert_eq!(outcome.field_changes.len(), 5);
    assert!(!outcome.written);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_complete_record_does_not_call_geocoder() {
    let dir = TempDir::new().unwrap();
    let path = write_sidecar(
        dir.path(),
        "full.xmp",
        &[
            ("exif:GPSLatitude", LAT),
            ("exif:GPSLongitude", LNG),
            ("Iptc4xmpCore:Location", "Akasaka"),
            ("photoshop:City", "Minato-ku"),
            ("photoshop:State", "Tokyo"),
            ("photoshop:Country", "Japan"),
            ("Iptc4xmpCore:CountryCode", "JP"),
        ],
    );

    let (geocoder, calls) = StubGeocoder::minato();
    let mut pipeline = EnrichmentPipeline::<_, _, MemoryCatalog, _>::new(
        XmpSidecar,
        XmpSidecar,
        None,
        Some(geocoder),
        OverridePolicy::overwrite_all(),
    );
    let outcome = pipeline.process(&path).await.unwrap();

    assert_eq!(outcome.geocode, GeocodeStatus::NotNeeded);
    assert_eq!(outcome.fields.location, "Akasaka");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreadable_sidecar_counts_as_failure() {
    let dir = TempDir::new().unwrap();
    let good = write_sidecar(dir.path(), "XT1R3587.xmp", &[]);
    let missing = dir.path().join("missing.xmp");

    let mut pipeline = EnrichmentPipeline::<_, _, _, StubGeocoder>::new(
        XmpSidecar,
        XmpSidecar,
        Some(tokyo_catalog()),
        None,
        OverridePolicy::default(),
    );
    let summary = pipeline.run(&[missing.clone(), good]).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failures[0].path, missing);
    assert!(summary.has_failures());
}

#[tokio::test]
async fn test_write_denied_fails_record_and_run_continues() {
    let dir = TempDir::new().unwrap();
    let denied = write_sidecar(dir.path(), "XT1R3587.xmp", &[]);
    let next_dir = dir.path().join("next");
    fs::create_dir(&next_dir).unwrap();
    let next = write_sidecar(&next_dir, "XT1R3587.xmp", &[]);

    let mut pipeline = EnrichmentPipeline::<_, _, _, StubGeocoder>::new(
        XmpSidecar,
        DenyingWriter { denied: denied.clone() },
        Some(tokyo_catalog()),
        None,
        OverridePolicy::default(),
    );

    let result = pipeline.process(&denied).await;
    assert!(matches!(result, Err(GeotagError::WriteDenied { .. })));

    let summary = pipeline.run(&[denied.clone(), next.clone()]).await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failures[0].path, denied);
    assert!(summary.failures[0].error.starts_with("Cannot write sidecar"));
    assert_eq!(XmpSidecar.read(&denied).await.unwrap().fields.city, "");
    assert_eq!(XmpSidecar.read(&next).await.unwrap().fields.city, "Minato-ku");
}
