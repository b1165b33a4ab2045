//! Merging sidecar, catalog and geocode values into the final field set
//!
//! A field may be written when it is empty or when the override policy allows
//! replacing it. A written field takes the catalog value if there is one,
//! otherwise the geocode value. Without a replacement value the current value
//! stays, so a field is never cleared.

use geotag_core::models::{Axis, LocationField, LocationFieldSet, OverridePolicy};
use geotag_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::codec::to_hemisphere_tagged;

/// Where a reconciled value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Catalog,
    Geocode,
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Catalog => f.write_str("catalog"),
            FieldSource::Geocode => f.write_str("geocode"),
        }
    }
}

/// Decision for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub field: LocationField,
    pub before: String,
    pub after: String,
    /// Set when a source value was taken, even if it equals `before`
    pub source: Option<FieldSource>,
}

impl FieldOutcome {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Final field set plus the per-field decisions that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub fields: LocationFieldSet,
    pub outcomes: Vec<FieldOutcome>,
}

impl Reconciliation {
    pub fn is_changed(&self, field: LocationField) -> bool {
        self.outcomes.iter().any(|o| o.field == field && o.changed())
    }

    pub fn any_changed(&self) -> bool {
        self.outcomes.iter().any(FieldOutcome::changed)
    }

    pub fn changes(&self) -> impl Iterator<Item = &FieldOutcome> {
        self.outcomes.iter().filter(|o| o.changed())
    }
}

/// Reconcile the five place fields of one record
pub fn reconcile(
    current: &LocationFieldSet,
    catalog: Option<&LocationFieldSet>,
    geocode: Option<&LocationFieldSet>,
    policy: &OverridePolicy,
) -> Reconciliation {
    let mut fields = current.clone();
    let mut outcomes = Vec::with_capacity(LocationField::ALL.len());

    for field in LocationField::ALL {
        let before = current.get(field);
        let may_write = !current.is_set(field) || policy.allows_overwrite(field);

        let replacement = if may_write { replacement_for(field, catalog, geocode) } else { None };

        if let Some((value, source)) = replacement {
            debug!(%field, before, after = value, %source, "Field reconciled");
            fields.set(field, value);
        }

        outcomes.push(FieldOutcome {
            field,
            before: before.to_string(),
            after: fields.get(field).to_string(),
            source: replacement.map(|(_, source)| source),
        });
    }

    Reconciliation { fields, outcomes }
}

fn replacement_for<'a>(
    field: LocationField,
    catalog: Option<&'a LocationFieldSet>,
    geocode: Option<&'a LocationFieldSet>,
) -> Option<(&'a str, FieldSource)> {
    let from = |set: Option<&'a LocationFieldSet>, source| {
        set.map(|s| s.get(field)).filter(|v| !v.is_empty()).map(|v| (v, source))
    };
    from(catalog, FieldSource::Catalog).or_else(|| from(geocode, FieldSource::Geocode))
}

/// Fill an empty sidecar coordinate from the catalog
///
/// Returns the hemisphere-tagged value to store, or `None` when the sidecar
/// already has a value or the catalog has none. Coordinates are never
/// overwritten.
pub fn reconcile_coordinate(current: &str, catalog: Option<f64>, axis: Axis) -> Result<Option<String>> {
    if !current.is_empty() {
        return Ok(None);
    }
    match catalog {
        Some(value) => {
            let tagged = to_hemisphere_tagged(value, axis)?;
            debug!(%axis, value, tagged = %tagged, "Coordinate filled from catalog");
            Ok(Some(tagged))
        }
        None => Ok(None),
    }
}
