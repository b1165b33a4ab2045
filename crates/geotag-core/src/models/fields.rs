use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GeotagError, Result};

/// A place-name property of a sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocationField {
    Location,
    City,
    State,
    Country,
    CountryCode,
}

impl LocationField {
    /// Every field, in processing order
    pub const ALL: [LocationField; 5] = [
        LocationField::Location,
        LocationField::City,
        LocationField::State,
        LocationField::Country,
        LocationField::CountryCode,
    ];

    /// Property name as it appears in metadata files
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationField::Location => "Location",
            LocationField::City => "City",
            LocationField::State => "State",
            LocationField::Country => "Country",
            LocationField::CountryCode => "CountryCode",
        }
    }
}

impl fmt::Display for LocationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationField {
    type Err = GeotagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "location" => Ok(LocationField::Location),
            "city" => Ok(LocationField::City),
            "state" => Ok(LocationField::State),
            "country" => Ok(LocationField::Country),
            "countrycode" | "country_code" => Ok(LocationField::CountryCode),
            _ => Err(GeotagError::ConfigInvalid {
                key: "fields".to_string(),
                reason: format!(
                    "Unknown field '{}'. Use location, city, state, country, or countrycode",
                    s
                ),
            }),
        }
    }
}

/// The five place-name values of one sidecar
///
/// A field is unset iff its value is the empty string. No relationship between
/// fields is enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFieldSet {
    pub location: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub country_code: String,
}

impl LocationFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: LocationField) -> &str {
        match field {
            LocationField::Location => &self.location,
            LocationField::City => &self.city,
            LocationField::State => &self.state,
            LocationField::Country => &self.country,
            LocationField::CountryCode => &self.country_code,
        }
    }

    pub fn set(&mut self, field: LocationField, value: impl Into<String>) {
        let slot = match field {
            LocationField::Location => &mut self.location,
            LocationField::City => &mut self.city,
            LocationField::State => &mut self.state,
            LocationField::Country => &mut self.country,
            LocationField::CountryCode => &mut self.country_code,
        };
        *slot = value.into();
    }

    /// Builder-style setter
    pub fn with(mut self, field: LocationField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_set(&self, field: LocationField) -> bool {
        !self.get(field).is_empty()
    }

    /// True if at least one field is unset
    pub fn has_unset(&self) -> bool {
        LocationField::ALL.iter().any(|f| !self.is_set(*f))
    }

    /// True if every field is unset
    pub fn is_empty(&self) -> bool {
        LocationField::ALL.iter().all(|f| !self.is_set(*f))
    }

    pub fn unset_fields(&self) -> Vec<LocationField> {
        LocationField::ALL.iter().copied().filter(|f| !self.is_set(*f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let mut fields = LocationFieldSet::new();
        for field in LocationField::ALL {
            assert!(!fields.is_set(field));
            fields.set(field, field.as_str());
        }
        for field in LocationField::ALL {
            assert_eq!(fields.get(field), field.as_str());
        }
        assert!(!fields.has_unset());
    }

    #[test]
    fn test_empty_string_is_unset() {
        let fields = LocationFieldSet::new()
            .with(LocationField::City, "Minato-ku")
            .with(LocationField::State, "");

        assert!(fields.is_set(LocationField::City));
        assert!(!fields.is_set(LocationField::State));
        assert!(!fields.is_empty());
        assert_eq!(
            fields.unset_fields(),
            vec![
                LocationField::Location,
                LocationField::State,
                LocationField::Country,
                LocationField::CountryCode
            ]
        );
    }

    #[test]
    fn test_parse_field_names() {
        assert_eq!("location".parse::<LocationField>().unwrap(), LocationField::Location);
        assert_eq!("City".parse::<LocationField>().unwrap(), LocationField::City);
        assert_eq!("STATE".parse::<LocationField>().unwrap(), LocationField::State);
        assert_eq!("countrycode".parse::<LocationField>().unwrap(), LocationField::CountryCode);
        assert!("overwrite".parse::<LocationField>().is_err());
        assert!("zip".parse::<LocationField>().is_err());
    }
}
