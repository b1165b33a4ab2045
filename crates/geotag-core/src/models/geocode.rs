//! Provider-agnostic reverse-geocode response
//!
//! Adapters map their wire format into these types. Entry and component order
//! is the document order of the provider response and must be preserved.

use serde::{Deserialize, Serialize};

/// One address component of a geocode entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub types: Vec<String>,
    pub short_name: String,
    pub long_name: String,
}

impl AddressComponent {
    pub fn new(
        types: &[&str],
        short_name: impl Into<String>,
        long_name: impl Into<String>,
    ) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            short_name: short_name.into(),
            long_name: long_name.into(),
        }
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// One candidate address returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeEntry {
    pub types: Vec<String>,
    pub components: Vec<AddressComponent>,
}

impl GeocodeEntry {
    pub fn new(types: &[&str], components: Vec<AddressComponent>) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            components,
        }
    }

    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// All entries of a reverse-geocode result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub entries: Vec<GeocodeEntry>,
}

impl GeocodeResponse {
    pub fn new(entries: Vec<GeocodeEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
