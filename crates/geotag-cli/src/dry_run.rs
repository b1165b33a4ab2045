use crate::output::OutputWriter;
use geotag_pipeline::RecordOutcome;
use serde::Serialize;

/// A sidecar write that a dry run skipped
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    pub action_type: ActionType,
    pub description: String,
    pub details: Vec<String>,
}

/// Types of actions that can be planned
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ModifyFile,
}

impl PlannedAction {
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            action_type,
            description: description.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Planned write for a record with changes; `None` when nothing would change
    pub fn for_outcome(outcome: &RecordOutcome) -> Option<Self> {
        if !outcome.has_changes() {
            return None;
        }

        let mut action = PlannedAction::new(
            ActionType::ModifyFile,
            format!("Update {}", outcome.path.display()),
        );
        for change in &outcome.coordinate_changes {
            action = action.with_detail(format!("{} -> {} (catalog)", change.axis, change.after));
        }
        for change in &outcome.field_changes {
            let before = if change.before.is_empty() { "(empty)" } else { change.before.as_str() };
            action = action.with_detail(format!(
                "{}: {} -> {} ({})",
                change.field, before, change.after, change.source
            ));
        }
        Some(action)
    }
}

/// Display planned actions in dry-run mode
pub fn display_planned_actions(output: &OutputWriter, actions: &[PlannedAction]) {
    output.section("Planned Actions (Dry Run)");
    if actions.is_empty() {
        output.info("No sidecar would change.");
        return;
    }

    for (i, action) in actions.iter().enumerate() {
        output.info(format!("{}. {:?}: {}", i + 1, action.action_type, action.description));
        for detail in &action.details {
            output.info(format!("   - {}", detail));
        }
    }
    output.info("No changes were made. Run without --dry-run to write these sidecars.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotag_core::models::{Axis, LocationField};
    use geotag_geo::FieldSource;
    use geotag_pipeline::{CoordinateChange, FieldChange};
    use std::path::Path;

    #[test]
    fn test_no_action_without_changes() {
        let outcome = RecordOutcome::new(Path::new("IMG_0001.xmp"), "IMG_0001");
        assert!(PlannedAction::for_outcome(&outcome).is_none());
    }

    #[test]
    fn test_action_lists_every_change() {
        let mut outcome = RecordOutcome::new(Path::new("IMG_0002.xmp"), "IMG_0002");
        outcome.coordinate_changes.push(CoordinateChange {
            axis: Axis::Latitude,
            before: String::new(),
            after: "35,40.0153533333S".to_string(),
        });
        outcome.field_changes.push(FieldChange {
            field: LocationField::City,
            before: String::new(),
            after: "Adelaide".to_string(),
            source: FieldSource::Geocode,
        });

        let action = PlannedAction::for_outcome(&outcome).unwrap();
        assert_eq!(action.details.len(), 2);
        assert_eq!(action.details[1], "City: (empty) -> Adelaide (geocode)");
    }

    #[test]
    fn test_action_type_serialization() {
        let action = PlannedAction::new(ActionType::ModifyFile, "Update a.xmp");
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("modify_file"));
    }
}
