//! Geotag Geocode - Reverse-geocoding ports and adapters
//!
//! This crate defines the reverse-geocode provider port along with the
//! Google Geocoding API adapter.

pub mod google;
pub mod ports;

pub use google::{GoogleGeocoder, GoogleGeocoderConfig};
pub use ports::GeocodeProvider;
