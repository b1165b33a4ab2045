//! Geocode port definitions

use async_trait::async_trait;
use geotag_core::error::Result;
use geotag_core::models::{CoordinatePair, GeocodeResponse};

/// Port for resolving coordinates into address candidates
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Short provider identifier used in logs and errors
    fn name(&self) -> &str;

    /// Reverse-geocode a coordinate pair
    ///
    /// An empty response means the provider knows no address there. Fails
    /// with `ProviderError` for anything else that goes wrong.
    async fn reverse_geocode(&self, coordinate: CoordinatePair) -> Result<GeocodeResponse>;
}
