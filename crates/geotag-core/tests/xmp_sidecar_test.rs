//! Integration tests for the XMP sidecar adapter
//!
//! These tests go through the metadata ports against real files on disk.

use geotag_core::formats::XmpSidecar;
use geotag_core::models::{LocationField, LocationFieldSet};
use geotag_core::ports::{MetadataReader, MetadataWriter};
use geotag_core::GeotagError;
use std::fs;
use tempfile::TempDir;

const SIDECAR: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:exif="http://ns.adobe.com/exif/1.0/"
    xmlns:photoshop="http://ns.adobe.com/photoshop/1.0/"
    xmlns:Iptc4xmpCore="http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/"
    exif:GPSLatitude="35,40.0153533333N"
    exif:GPSLongitude="139,44.7859366667E"
    photoshop:City="Minato-ku"
    Iptc4xmpCore:Location="">
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>
"#;

#[tokio::test]
async fn test_read_sidecar() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("XT1R3587.xmp");
    fs::write(&path, SIDECAR).unwrap();

    let record = XmpSidecar::new().read(&path).await.unwrap();

    assert_eq!(record.base_name(), "XT1R3587");
    assert_eq!(record.latitude, "35,40.0153533333N");
    assert_eq!(record.longitude, "139,44.7859366667E");
    assert_eq!(record.fields.city, "Minato-ku");
    assert_eq!(record.fields.location, "");
    assert_eq!(record.fields.unset_fields().len(), 4);
}

#[tokio::test]
async fn test_write_then_read_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("XT1R3587.xmp");
    fs::write(&path, SIDECAR).unwrap();

    let fields = LocationFieldSet::new()
        .with(LocationField::Location, "Roppongi")
        .with(LocationField::City, "Minato-ku")
        .with(LocationField::State, "Tokyo")
        .with(LocationField::Country, "Japan")
        .with(LocationField::CountryCode, "JP");

    let sidecar = XmpSidecar::new();
    sidecar.write(&path, &fields, "35,40.0153533333N", "139,44.7859366667E").await.unwrap();

    let record = sidecar.read(&path).await.unwrap();
    assert_eq!(record.fields, fields);
    assert_eq!(record.latitude, "35,40.0153533333N");
}

#[tokio::test]
async fn test_write_skips_empty_values() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a.xmp");
    fs::write(&path, SIDECAR).unwrap();

    // Nothing differs from the stored values, so the file stays byte-identical
    let fields = LocationFieldSet::new().with(LocationField::City, "Minato-ku");
    XmpSidecar::new().write(&path, &fields, "", "").await.unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), SIDECAR);
}

#[tokio::test]
async fn test_write_adds_coordinates_to_empty_sidecar() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("b.xmp");
    fs::write(
        &path,
        r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about=""/></rdf:RDF>"#,
    )
    .unwrap();

    let sidecar = XmpSidecar::new();
    sidecar
        .write(&path, &LocationFieldSet::new(), "35,40.0153533333S", "139,44.7859366667W")
        .await
        .unwrap();

    let record = sidecar.read(&path).await.unwrap();
    assert_eq!(record.latitude, "35,40.0153533333S");
    assert_eq!(record.longitude, "139,44.7859366667W");
}

#[tokio::test]
async fn test_missing_file_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();
    let result = XmpSidecar::new().read(&temp_dir.path().join("missing.xmp")).await;
    assert!(matches!(result, Err(GeotagError::UnreadableSource { .. })));
}

#[tokio::test]
async fn test_non_xmp_content_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("c.xmp");
    fs::write(&path, "<html><body>not a sidecar</body></html>").unwrap();

    let result = XmpSidecar::new().read(&path).await;
    assert!(matches!(result, Err(GeotagError::UnreadableSource { .. })));
}
