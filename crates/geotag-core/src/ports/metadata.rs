use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::models::{LocationFieldSet, MetadataRecord};

/// Port for loading sidecar metadata
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// Read the coordinates and place fields of one sidecar
    ///
    /// Fails with `UnreadableSource` if the file cannot be opened or parsed.
    async fn read(&self, path: &Path) -> Result<MetadataRecord>;
}

/// Port for persisting reconciled metadata
#[async_trait]
pub trait MetadataWriter: Send + Sync {
    /// Write place fields and coordinates back to a sidecar
    ///
    /// Empty values are never written; they leave the stored value untouched.
    /// Fails with `WriteDenied` if the destination is not writable.
    async fn write(
        &self,
        path: &Path,
        fields: &LocationFieldSet,
        latitude: &str,
        longitude: &str,
    ) -> Result<()>;
}
