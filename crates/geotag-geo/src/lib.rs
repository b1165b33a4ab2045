//! Geotag Geo - Coordinate conversion and field reconciliation
//!
//! This crate holds the decision rules of geotag: converting between
//! hemisphere-tagged and decimal coordinates, choosing place names from a
//! reverse-geocode response, merging the candidate sources under an override
//! policy, and de-duplicating geocode lookups within a run.

pub mod cache;
pub mod codec;
pub mod reconcile;
pub mod selector;

pub use cache::{CacheStats, CoordinateKey, LookupCache};
pub use codec::{parse_coordinate, parse_hemisphere_tagged, to_hemisphere_tagged};
pub use reconcile::{reconcile, reconcile_coordinate, FieldOutcome, FieldSource, Reconciliation};
pub use selector::select_fields;
