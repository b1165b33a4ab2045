pub mod coordinate;
pub mod fields;
pub mod geocode;
pub mod policy;
pub mod record;

pub use coordinate::{Axis, CoordinatePair};
pub use fields::{LocationField, LocationFieldSet};
pub use geocode::{AddressComponent, GeocodeEntry, GeocodeResponse};
pub use policy::OverridePolicy;
pub use record::{base_name, CatalogRow, MetadataRecord};
