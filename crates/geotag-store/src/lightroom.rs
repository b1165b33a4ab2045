//! Adobe Lightroom Classic catalog adapter
//!
//! A Lightroom catalog is a SQLite database (`*.lrcat`). Harvested EXIF data
//! holds decimal GPS coordinates; the IPTC place names live in interned lookup
//! tables referenced from `AgHarvestedIptcMetadata`. The catalog is opened
//! read-only.

use async_trait::async_trait;
use geotag_core::error::{GeotagError, Result};
use geotag_core::models::{CatalogRow, LocationField};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ports::CatalogLookup;

/// File extension of Lightroom catalogs
pub const CATALOG_EXTENSION: &str = "lrcat";

const FIND_BY_BASE_NAME: &str = "\
SELECT Adobe_images.id_local, AgLibraryFile.baseName, AgLibraryFolder.pathFromRoot, \
       AgLibraryFile.originalFilename, \
       AgHarvestedExifMetadata.gpsLatitude, AgHarvestedExifMetadata.gpsLongitude, \
       AgHarvestedIptcMetadata.locationDataOrigination, \
       AgInternedIptcLocation.value AS Location, AgInternedIptcCity.value AS City, \
       AgInternedIptcState.value AS State, AgInternedIptcCountry.value AS Country, \
       AgInternedIptcIsoCountryCode.value AS CountryCode \
FROM AgLibraryFile, AgHarvestedExifMetadata, AgLibraryFolder, Adobe_images \
LEFT JOIN AgHarvestedIptcMetadata ON Adobe_images.id_local = AgHarvestedIptcMetadata.image \
LEFT JOIN AgInternedIptcLocation ON AgHarvestedIptcMetadata.locationRef = AgInternedIptcLocation.id_local \
LEFT JOIN AgInternedIptcCity ON AgHarvestedIptcMetadata.cityRef = AgInternedIptcCity.id_local \
LEFT JOIN AgInternedIptcState ON AgHarvestedIptcMetadata.stateRef = AgInternedIptcState.id_local \
LEFT JOIN AgInternedIptcCountry ON AgHarvestedIptcMetadata.countryRef = AgInternedIptcCountry.id_local \
LEFT JOIN AgInternedIptcIsoCountryCode ON AgHarvestedIptcMetadata.isoCountryCodeRef = AgInternedIptcIsoCountryCode.id_local \
WHERE Adobe_images.rootFile = AgLibraryFile.id_local \
  AND Adobe_images.id_local = AgHarvestedExifMetadata.image \
  AND AgLibraryFile.folder = AgLibraryFolder.id_local \
  AND AgLibraryFile.baseName = ?";

/// Read-only connection to a Lightroom catalog
pub struct LightroomCatalog {
    pool: SqlitePool,
    path: PathBuf,
}

impl LightroomCatalog {
    /// Open a catalog file
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let options = SqliteConnectOptions::new().filename(&path).read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| unavailable(&path, format!("Failed to open catalog: {}", e)))?;

        info!(catalog = %path.display(), "Opened Lightroom catalog");
        Ok(Self { pool, path })
    }

    /// Open the first catalog (by file name) found in a Lightroom folder
    pub async fn open_folder(folder: &Path) -> Result<Self> {
        let path = find_catalog_file(folder)?;
        Self::open(path).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Locate the catalog file inside a Lightroom folder
pub fn find_catalog_file(folder: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(folder)
        .map_err(|e| unavailable(folder, format!("Cannot read folder: {}", e)))?;

    let mut catalogs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case(CATALOG_EXTENSION))
                    .unwrap_or(false)
        })
        .collect();
    catalogs.sort();

    catalogs
        .into_iter()
        .next()
        .ok_or_else(|| unavailable(folder, "No .lrcat file found in folder".to_string()))
}

fn unavailable(path: &Path, reason: String) -> GeotagError {
    GeotagError::CatalogUnavailable { path: path.to_path_buf(), reason }
}

fn text_column(row: &SqliteRow, column: &str) -> std::result::Result<String, sqlx::Error> {
    Ok(row.try_get::<Option<String>, _>(column)?.unwrap_or_default())
}

fn row_to_catalog(name: &str, row: &SqliteRow) -> std::result::Result<CatalogRow, sqlx::Error> {
    let mut catalog_row = CatalogRow::new(name);
    catalog_row.latitude = row.try_get::<Option<f64>, _>("gpsLatitude")?;
    catalog_row.longitude = row.try_get::<Option<f64>, _>("gpsLongitude")?;
    for field in LocationField::ALL {
        catalog_row.fields.set(field, text_column(row, field.as_str())?.trim());
    }
    Ok(catalog_row)
}

#[async_trait]
impl CatalogLookup for LightroomCatalog {
    async fn find_by_base_name(&self, name: &str) -> Result<Option<CatalogRow>> {
        let row = sqlx::query(FIND_BY_BASE_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable(&self.path, format!("Catalog query failed: {}", e)))?;

        let Some(row) = row else {
            debug!(base_name = name, "No catalog entry");
            return Ok(None);
        };

        let catalog_row = row_to_catalog(name, &row)
            .map_err(|e| unavailable(&self.path, format!("Unexpected catalog row: {}", e)))?;
        debug!(base_name = name, row = ?catalog_row, "Catalog entry found");
        Ok(Some(catalog_row))
    }
}
