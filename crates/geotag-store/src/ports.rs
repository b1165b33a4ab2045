use async_trait::async_trait;
use geotag_core::error::Result;
use geotag_core::models::CatalogRow;

/// Port for looking up images in an external catalog
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Find the catalog row for an image by its base file name
    ///
    /// Returns `None` when the catalog has no such image. Fails with
    /// `CatalogUnavailable` if the backing store cannot be queried.
    async fn find_by_base_name(&self, name: &str) -> Result<Option<CatalogRow>>;
}
