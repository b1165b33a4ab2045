//! Place-name selection from a reverse-geocode response
//!
//! Only entries tagged `premise` are considered. Their components are scanned
//! in document order and the first match for a field wins, across all
//! qualifying entries.

use geotag_core::models::{AddressComponent, GeocodeResponse, LocationField, LocationFieldSet};
use tracing::trace;

pub const PREMISE: &str = "premise";
pub const COUNTRY: &str = "country";
pub const ADMIN_LEVEL_1: &str = "administrative_area_level_1";
pub const ADMIN_LEVEL_2: &str = "administrative_area_level_2";
pub const LOCALITY: &str = "locality";
pub const SUBLOCALITY_LEVEL_1: &str = "sublocality_level_1";
pub const SUBLOCALITY_LEVEL_2: &str = "sublocality_level_2";
pub const ROUTE: &str = "route";

/// Extract place fields from a geocode response
///
/// Returns an all-empty set when no entry qualifies.
pub fn select_fields(response: &GeocodeResponse) -> LocationFieldSet {
    let mut fields = LocationFieldSet::new();

    for entry in response.entries.iter().filter(|e| e.has_type(PREMISE)) {
        for component in &entry.components {
            apply_component(&mut fields, component);
        }
    }

    trace!(?fields, "Selected geocode fields");
    fields
}

fn apply_component(fields: &mut LocationFieldSet, component: &AddressComponent) {
    // Country and its code come from the same component
    if component.has_type(COUNTRY)
        && !fields.is_set(LocationField::Country)
        && !fields.is_set(LocationField::CountryCode)
    {
        fields.set(LocationField::CountryCode, component.short_name.as_str());
        fields.set(LocationField::Country, component.long_name.as_str());
    }

    fill(fields, LocationField::State, component, &[ADMIN_LEVEL_1, ADMIN_LEVEL_2]);
    fill(fields, LocationField::City, component, &[LOCALITY]);
    fill(
        fields,
        LocationField::Location,
        component,
        &[SUBLOCALITY_LEVEL_1, SUBLOCALITY_LEVEL_2, ROUTE],
    );
}

/// Set `field` from the component's long name if still empty and a tag matches
fn fill(
    fields: &mut LocationFieldSet,
    field: LocationField,
    component: &AddressComponent,
    tags: &[&str],
) {
    if !fields.is_set(field) && tags.iter().any(|tag| component.has_type(tag)) {
        fields.set(field, component.long_name.as_str());
    }
}
