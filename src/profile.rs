//! Adapters from exported payloads to the records the core compares.

use serde_json::{Map, Value, json};

use crate::bounds::{AxisKey, BoundsSet};
use crate::feeds::PlannerEvent;

/// Maps a machine profile (`{axes: {X: {travel_min_mm, travel_max_mm}}}`, or the
/// axes map itself) onto a bounds record keyed by lowercase axis names. Entries
/// without travel limits pass through unchanged so their own aliases can
/// still resolve.
pub fn machine_bounds_from_profile(profile: &Value) -> Value {
    let axes = match profile.get("axes") {
        Some(Value::Object(axes)) => axes,
        _ => match profile.as_object() {
            Some(axes) => axes,
            None => return Value::Null,
        },
    };

    let mut record = Map::new();
    for (key, entry) in axes {
        let mapped = match (entry.get("travel_min_mm"), entry.get("travel_max_mm")) {
            (Some(min), Some(max)) if !min.is_null() && !max.is_null() => {
                json!({ "min": min, "max": max })
            }
            _ => entry.clone(),
        };
        let lower = key.to_ascii_lowercase();
        // An entry already spelled in lowercase beats its uppercase twin.
        if lower == *key || !record.contains_key(&lower) {
            record.insert(lower, mapped);
        }
    }
    Value::Object(record)
}

// Planner exports name their bounds `x_mm`, `extrusion_mm`, ...
fn planner_bounds_record(bounds: &Value) -> Value {
    let Some(fields) = bounds.as_object() else {
        return bounds.clone();
    };
    let mut record = fields.clone();
    for (key, entry) in fields {
        if let Some(axis) = key.strip_suffix("_mm") {
            if !fields.contains_key(axis) {
                record.insert(axis.to_string(), entry.clone());
            }
        }
    }
    Value::Object(record)
}

// `commands[].state` as written by the planner export, one event per command.
fn events_from_commands(commands: &Value) -> Vec<PlannerEvent> {
    let Some(commands) = commands.as_array() else {
        return Vec::new();
    };
    commands
        .iter()
        .filter(|entry| entry.is_object())
        .map(|entry| {
            let state = entry.get("state").unwrap_or(&Value::Null);
            let mut event = Map::new();
            if let Some(comment) = entry.get("comment") {
                event.insert("comment".to_string(), comment.clone());
            }
            for (field, key) in [("x", "x_mm"), ("y", "y_mm"), ("z", "z_mm"), ("extrusion", "extrusion_mm")] {
                if let Some(v) = state.get(key) {
                    event.insert(field.to_string(), v.clone());
                }
            }
            PlannerEvent::from_value(&Value::Object(event))
        })
        .collect()
}

/// The slice of a planner export the preview needs.
#[derive(Clone, Debug, Default)]
pub struct PlannerPayload {
    pub bounds: Value,
    pub events: Vec<PlannerEvent>,
    pub defaults: Value,
}

impl PlannerPayload {
    /// Reads either a pre-flattened `{bounds, events}` record or the planner
    /// export shape `{bounds: {x_mm, ..}, commands: [{comment, state}]}`.
    pub fn from_value(payload: &Value) -> Self {
        let field = |key: &str| payload.get(key).cloned().unwrap_or(Value::Null);
        let events = match payload.get("events") {
            Some(events @ Value::Array(_)) => PlannerEvent::list_from_value(events),
            _ => events_from_commands(&field("commands")),
        };
        PlannerPayload {
            bounds: planner_bounds_record(&field("bounds")),
            events,
            defaults: field("defaults"),
        }
    }

    pub fn bounds_set(&self) -> BoundsSet {
        BoundsSet::from_record(&self.bounds)
    }

    /// Extrusion the plan starts from: the minimum of its extrusion bound.
    pub fn extrusion_baseline(&self) -> Option<f64> {
        self.bounds_set().get(AxisKey::E).map(|b| b.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::{AxisBounds, reconcile};

    #[test]
    fn travel_limits_become_bounds() {
        let profile = json!({
            "axes": {
                "X": { "microstepping": 16, "steps_per_mm": 80, "travel_min_mm": 0, "travel_max_mm": 250 },
                "Y": { "microstepping": 16, "steps_per_mm": 100, "min_mm": 0, "max_mm": 220 },
                "Z": { "travel_min_mm": -10, "travel_max_mm": 15 },
            }
        });
        let set = BoundsSet::from_record(&machine_bounds_from_profile(&profile));
        assert_eq!(set.x, Some(AxisBounds { min: 0.0, max: 250.0 }));
        assert_eq!(set.y, Some(AxisBounds { min: 0.0, max: 220.0 }));
        assert_eq!(set.z, Some(AxisBounds { min: -10.0, max: 15.0 }));
        assert_eq!(set.e, None);
    }

    #[test]
    fn bare_axes_map_is_accepted() {
        let profile = json!({ "x": { "travel_min_mm": 1, "travel_max_mm": 2 } });
        let set = BoundsSet::from_record(&machine_bounds_from_profile(&profile));
        assert_eq!(set.x, Some(AxisBounds { min: 1.0, max: 2.0 }));
        assert_eq!(machine_bounds_from_profile(&json!({ "axes": null })), json!({ "axes": null }));
        assert_eq!(machine_bounds_from_profile(&json!(null)), Value::Null);
    }

    #[test]
    fn profile_without_extrusion_axis_cannot_fit() {
        let profile = json!({
            "axes": {
                "X": { "travel_min_mm": 0, "travel_max_mm": 250 },
                "Y": { "travel_min_mm": 0, "travel_max_mm": 200 },
                "Z": { "travel_min_mm": -10, "travel_max_mm": 15 },
            }
        });
        let planner = json!({
            "x": { "min": 0, "max": 20 },
            "y": { "min": 0, "max": 12 },
            "z": { "min": -2, "max": 4 },
            "e": { "min": 0, "max": 2.1 },
        });
        let result = reconcile(&planner, &machine_bounds_from_profile(&profile));
        assert_eq!(result.missing_machine_axes, vec![AxisKey::E]);
        assert!(result.exceeding_axes.is_empty());
        assert!(!result.fits);
    }

    #[test]
    fn planner_payload_reads_bounds_events_and_baseline() {
        let payload = PlannerPayload::from_value(&json!({
            "bounds": { "x": { "min": 0, "max": 18 }, "extrusion": { "min": 0.5, "max": 2.1 } },
            "events": [{ "comment": "plunge", "extrusion": 0.5 }, { "comment": "feed yarn" }],
            "defaults": { "safe_z_mm": 4.0 },
        }));
        assert_eq!(payload.events.len(), 2);
        assert_eq!(payload.extrusion_baseline(), Some(0.5));
        assert_eq!(payload.defaults["safe_z_mm"], json!(4.0));

        let empty = PlannerPayload::from_value(&json!("garbage"));
        assert!(empty.events.is_empty());
        assert_eq!(empty.extrusion_baseline(), None);
    }

    #[test]
    fn profile_axis_names_are_lowercased() {
        let profile = json!({
            "axes": {
                "E": { "travel_min_mm": 0, "travel_max_mm": 500 },
                "x": { "travel_min_mm": 0, "travel_max_mm": 100 },
                "X": { "travel_min_mm": 0, "travel_max_mm": 999 },
            }
        });
        let record = machine_bounds_from_profile(&profile);
        assert!(record.get("E").is_none());
        let set = BoundsSet::from_record(&record);
        assert_eq!(set.e, Some(AxisBounds { min: 0.0, max: 500.0 }));
        assert_eq!(set.x, Some(AxisBounds { min: 0.0, max: 100.0 }));
    }

    #[test]
    fn planner_export_commands_become_events() {
        let payload = PlannerPayload::from_value(&json!({
            "version": 1,
            "units": "millimeters",
            "bounds": {
                "x_mm": { "min": 0.0, "max": 5.0 },
                "y_mm": { "min": 0.0, "max": 0.0 },
                "z_mm": { "min": -1.5, "max": 4.0 },
                "extrusion_mm": { "min": 0.0, "max": 0.5 },
            },
            "commands": [
                { "index": 0, "command": "G21", "comment": "use millimeters",
                  "state": { "x_mm": 0.0, "y_mm": 0.0, "z_mm": 4.0, "extrusion_mm": 0.0 } },
                { "index": 1, "command": "G1", "comment": "chain stitch 1 of 1: plunge",
                  "state": { "x_mm": 0.0, "y_mm": 0.0, "z_mm": -1.5, "extrusion_mm": 0.0 } },
                { "index": 2, "command": "G1", "comment": "chain stitch 1 of 1: feed yarn",
                  "state": { "x_mm": 0.0, "y_mm": 0.0, "z_mm": -1.5, "extrusion_mm": 0.5 } },
                "not a command",
                { "index": 3, "command": "G0",
                  "state": { "x_mm": 5.0, "y_mm": 0.0, "z_mm": 4.0, "extrusion_mm": 0.5 } },
            ],
        }));

        assert_eq!(payload.events.len(), 4);
        assert_eq!(payload.events[2].comment.as_deref(), Some("chain stitch 1 of 1: feed yarn"));
        assert_eq!(payload.events[3].comment, None);
        assert_eq!(payload.events[3].x, Some(5.0));
        assert_eq!(payload.events[1].z, Some(-1.5));

        let set = payload.bounds_set();
        assert_eq!(set.x, Some(AxisBounds { min: 0.0, max: 5.0 }));
        assert_eq!(set.z, Some(AxisBounds { min: -1.5, max: 4.0 }));
        assert_eq!(set.e, Some(AxisBounds { min: 0.0, max: 0.5 }));
        assert_eq!(payload.extrusion_baseline(), Some(0.0));

        let feeds = crate::feeds::detect_feed_pulses(&payload.events, payload.extrusion_baseline());
        assert_eq!(feeds.as_slice(), &[2]);
    }

    #[test]
    fn plain_axis_keys_win_over_mm_suffixed_ones() {
        let payload = PlannerPayload::from_value(&json!({
            "bounds": { "x": { "min": 1, "max": 2 }, "x_mm": { "min": 0, "max": 50 } },
            "events": [],
            "commands": [{ "state": { "x_mm": 1.0 } }],
        }));
        assert_eq!(payload.bounds_set().x, Some(AxisBounds { min: 1.0, max: 2.0 }));
        assert!(payload.events.is_empty());
    }
}
