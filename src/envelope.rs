use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bounds::{AxisBounds, BoundsSet, coerce_number};
use crate::config::{DEFAULT_TRAVEL_SPAN, ENVELOPE_COLLAPSE_THRESHOLD, ENVELOPE_SPAN_FLOOR};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FallbackSpan {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FallbackSpan {
    pub fn is_usable(&self) -> bool {
        [self.x, self.y, self.z].iter().all(|v| v.is_finite() && *v > 0.0)
    }

    /// Reads `{x, y, z}` from a record, falling back to the default bed span
    /// when any dimension is unusable.
    pub fn from_record(record: &Value) -> Self {
        let Some(map) = record.as_object() else {
            return DEFAULT_TRAVEL_SPAN;
        };
        let read = |key: &str| map.get(key).map_or(f64::NAN, coerce_number);
        FallbackSpan { x: read("x"), y: read("y"), z: read("z") }.or_default()
    }

    fn or_default(self) -> Self {
        if self.is_usable() { self } else { DEFAULT_TRAVEL_SPAN }
    }
}

impl Default for FallbackSpan {
    fn default() -> Self {
        DEFAULT_TRAVEL_SPAN
    }
}

/// Size and placement of the travel-envelope cage handed to the scene.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeBox {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
}

// (span, center) for one axis
fn axis_extent(bounds: Option<AxisBounds>, fallback: f64) -> (f64, f64) {
    let Some(b) = bounds else {
        return (fallback, 0.0);
    };
    let span = b.span().max(ENVELOPE_SPAN_FLOOR);
    let span = if span.is_finite() && span >= ENVELOPE_COLLAPSE_THRESHOLD { span } else { fallback };
    let center = b.center();
    (span, if center.is_finite() { center } else { 0.0 })
}

pub fn build_envelope_box(bounds: Option<&BoundsSet>, fallback: FallbackSpan) -> EnvelopeBox {
    let fallback = fallback.or_default();
    let Some(bounds) = bounds else {
        return EnvelopeBox {
            width: fallback.x,
            depth: fallback.y,
            height: fallback.z,
            center_x: 0.0,
            center_y: 0.0,
            center_z: 0.0,
        };
    };
    let (width, center_x) = axis_extent(bounds.x, fallback.x);
    let (depth, center_y) = axis_extent(bounds.y, fallback.y);
    let (height, center_z) = axis_extent(bounds.z, fallback.z);
    EnvelopeBox { width, depth, height, center_x, center_y, center_z }
}
