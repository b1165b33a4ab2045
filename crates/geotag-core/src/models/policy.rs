use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::LocationField;

/// Control word that turns on overwriting for every field
pub const OVERWRITE_ALL: &str = "overwrite";

/// Which already-set sidecar fields may be replaced
///
/// The default policy only fills empty fields. A field listed in `selected`
/// may be replaced even when set, and `overwrite_all` grants that for every
/// field. Either condition alone is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridePolicy {
    pub selected: BTreeSet<LocationField>,
    pub overwrite_all: bool,
}

impl OverridePolicy {
    /// Only fill fields that are empty
    pub fn fill_only() -> Self {
        Self::default()
    }

    /// Replace every field a source has a value for
    pub fn overwrite_all() -> Self {
        Self { selected: BTreeSet::new(), overwrite_all: true }
    }

    pub fn with_field(mut self, field: LocationField) -> Self {
        self.selected.insert(field);
        self
    }

    /// Build a policy from control words such as `["overwrite", "city"]`
    pub fn from_controls<I, S>(controls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        for control in controls {
            let control = control.as_ref().trim();
            if control.eq_ignore_ascii_case(OVERWRITE_ALL) {
                policy.overwrite_all = true;
            } else {
                policy.selected.insert(control.parse()?);
            }
        }
        Ok(policy)
    }

    /// Whether an already-set value of `field` may be replaced
    pub fn allows_overwrite(&self, field: LocationField) -> bool {
        self.overwrite_all || self.selected.contains(&field)
    }

    /// Control words describing this policy, for display and config round-trips
    pub fn controls(&self) -> Vec<String> {
        let mut controls = Vec::new();
        if self.overwrite_all {
            controls.push(OVERWRITE_ALL.to_string());
        }
        controls.extend(self.selected.iter().map(|f| f.as_str().to_lowercase()));
        controls
    }
}
