use anyhow::{bail, Context, Result};
use geotag_core::formats::is_sidecar_path;
use std::fs;
use std::path::{Path, PathBuf};

/// Expand the given files and folders into the sidecars to process
///
/// Every source must exist and be writable. Folders are scanned recursively.
/// The result is sorted and free of duplicates.
pub fn discover_sidecars(sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut discovered = Vec::new();

    for source in sources {
        let metadata = fs::metadata(source)
            .with_context(|| format!("Source not found: {}", source.display()))?;
        if metadata.permissions().readonly() {
            bail!("Source is not writable: {}", source.display());
        }

        if metadata.is_dir() {
            scan_directory(source, &mut discovered)?;
        } else if is_sidecar_path(source) {
            discovered.push(source.clone());
        } else {
            bail!("Not an XMP sidecar: {}", source.display());
        }
    }

    discovered.sort();
    discovered.dedup();
    Ok(discovered)
}

fn scan_directory(dir_path: &Path, discovered: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read directory: {}", dir_path.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory(&path, discovered)?;
        } else if path.is_file() && is_sidecar_path(&path) {
            discovered.push(path);
        }
    }

    Ok(())
}
