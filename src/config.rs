//! Frozen viewer configuration: tolerances, default spans, and the fallback
//! pattern shown before a planner export is loaded.

use serde::Serialize;

use crate::envelope::FallbackSpan;
use crate::feeds::PlannerEvent;

/// Extrusion increase (mm) above which a step counts as a feed pulse.
pub const FEED_DELTA_TOLERANCE: f64 = 0.01;

/// Smallest span the envelope builder will emit before the collapse check.
pub const ENVELOPE_SPAN_FLOOR: f64 = 0.0001;
/// Spans below this are unusable machine data and use the fallback span.
pub const ENVELOPE_COLLAPSE_THRESHOLD: f64 = 0.001;

/// Bed span used when no machine envelope is known (mm).
pub const DEFAULT_TRAVEL_SPAN: FallbackSpan = FallbackSpan { x: 480.0, y: 320.0, z: 120.0 };

pub const PLANNER_UPLOAD_LIMIT_BYTES: u64 = 10 * 1024 * 1024;

// (comment, x, y, z, extrusion)
const FALLBACK_PATTERN_TABLE: [(&str, f64, f64, f64, f64); 22] = [
    ("use millimeters", 0.0, 0.0, 4.0, 0.0),
    ("absolute positioning", 0.0, 0.0, 4.0, 0.0),
    ("zero axes", 0.0, 0.0, 4.0, 0.0),
    ("chain stitch 1 of 3: plunge", 0.0, 0.0, -1.5, 0.0),
    ("chain stitch 1 of 3: feed yarn", 0.0, 0.0, -1.5, 0.5),
    ("chain stitch 1 of 3: raise", 0.0, 0.0, 4.0, 0.5),
    ("chain stitch 1 of 3: advance", 5.0, 0.0, 4.0, 0.5),
    ("chain stitch 2 of 3: plunge", 5.0, 0.0, -1.5, 0.5),
    ("chain stitch 2 of 3: feed yarn", 5.0, 0.0, -1.5, 1.0),
    ("chain stitch 2 of 3: raise", 5.0, 0.0, 4.0, 1.0),
    ("chain stitch 2 of 3: advance", 10.0, 0.0, 4.0, 1.0),
    ("chain stitch 3 of 3: plunge", 10.0, 0.0, -1.5, 1.0),
    ("chain stitch 3 of 3: feed yarn", 10.0, 0.0, -1.5, 1.5),
    ("chain stitch 3 of 3: raise", 10.0, 0.0, 4.0, 1.5),
    ("chain stitch 3 of 3: advance", 15.0, 0.0, 4.0, 1.5),
    ("pause for 0.400 s", 15.0, 0.0, 4.0, 1.5),
    ("reposition", 18.0, 5.0, 4.0, 1.5),
    ("turn to next row", 0.0, 12.0, 4.0, 1.5),
    ("single stitch 1 of 1: plunge", 0.0, 12.0, -2.0, 1.5),
    ("single stitch 1 of 1: feed yarn", 0.0, 12.0, -2.0, 2.1),
    ("single stitch 1 of 1: raise", 0.0, 12.0, 4.0, 2.1),
    ("single stitch 1 of 1: advance", 4.5, 12.0, 4.0, 2.1),
];

pub fn fallback_pattern_events() -> Vec<PlannerEvent> {
    FALLBACK_PATTERN_TABLE
        .iter()
        .map(|&(comment, x, y, z, extrusion)| PlannerEvent {
            comment: Some(comment.to_string()),
            extrusion: Some(extrusion),
            x: Some(x),
            y: Some(y),
            z: Some(z),
        })
        .collect()
}

#[derive(Serialize, Clone, Copy, Debug)]
pub struct PatternDefaults {
    pub safe_z_mm: f64,
    pub fabric_plane_z_mm: f64,
    pub travel_feed_rate_mm_min: f64,
    pub plunge_feed_rate_mm_min: f64,
    pub yarn_feed_rate_mm_min: f64,
    pub default_row_height_mm: f64,
    pub row_spacing_mm: f64,
    pub require_home: bool,
    pub home_state: &'static str,
}

pub const FALLBACK_PATTERN_DEFAULTS: PatternDefaults = PatternDefaults {
    safe_z_mm: 4.0,
    fabric_plane_z_mm: 0.0,
    travel_feed_rate_mm_min: 1200.0,
    plunge_feed_rate_mm_min: 600.0,
    yarn_feed_rate_mm_min: 300.0,
    default_row_height_mm: 6.0,
    row_spacing_mm: 6.0,
    require_home: false,
    home_state: "unknown",
};

#[derive(Serialize, Clone, Copy, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FallbackMessages {
    pub machine_profile_envelope_fallback_message: &'static str,
    pub machine_profile_envelope_missing_axes_prefix: &'static str,
    pub bounds_comparison_fallback_message: &'static str,
    pub pattern_bounds_fallback_message: &'static str,
    pub yarn_flow_status_fallback_message: &'static str,
    pub yarn_flow_queue_fallback_message: &'static str,
    pub yarn_flow_upcoming_fallback_message: &'static str,
}

pub const FALLBACK_MESSAGES: FallbackMessages = FallbackMessages {
    machine_profile_envelope_fallback_message:
        "Machine profile envelope unavailable. Include travel_min_mm and travel_max_mm for each axis.",
    machine_profile_envelope_missing_axes_prefix:
        "Machine profile envelope unavailable \u{2014} add travel_min_mm and travel_max_mm for: ",
    bounds_comparison_fallback_message:
        "Bounds comparison unavailable. Export planner bounds and machine profile limits to compare.",
    pattern_bounds_fallback_message:
        "Planner bounds unavailable. Export --format planner payloads with bounds to preview the motion envelope.",
    yarn_flow_status_fallback_message:
        "Yarn flow monitor idle \u{2014} load a planner preview to track feed events.",
    yarn_flow_queue_fallback_message: "Remaining feed pulses: Awaiting planner preview\u{2026}",
    yarn_flow_upcoming_fallback_message: "Next feed pulses: Awaiting planner preview\u{2026}",
};
