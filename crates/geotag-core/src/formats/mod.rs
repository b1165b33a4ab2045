//! Sidecar metadata formats
//!
//! Each format implements the `MetadataReader` and `MetadataWriter` ports.
//! XMP is the only sidecar format handled today.

use std::path::Path;

pub mod xmp;

pub use xmp::{XmpProperty, XmpSidecar};

/// File extensions recognised as sidecar files (lowercase)
pub const SIDECAR_EXTENSIONS: &[&str] = &["xmp"];

/// Check whether a path looks like a sidecar file, ignoring extension case
pub fn is_sidecar_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SIDECAR_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}
