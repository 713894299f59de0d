use wasm_bindgen::prelude::*;
use serde::Serialize;
use serde_json::Value;

// --- LOGGING ---
#[cfg(target_arch = "wasm32")]
fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

#[cfg(not(target_arch = "wasm32"))]
fn log(_s: &str) {}
macro_rules! console_log {
    ($($t:tt)*) => ($crate::log(&format!($($t)*)))
}

pub mod bounds;
pub mod config;
pub mod envelope;
pub mod feeds;
pub mod format;
pub mod overlay;
pub mod profile;

use bounds::{BoundsSet, normalize_axis_bounds, reconcile};
use config::{DEFAULT_TRAVEL_SPAN, FALLBACK_MESSAGES, FALLBACK_PATTERN_DEFAULTS, fallback_pattern_events};
use envelope::{FallbackSpan, build_envelope_box};
use feeds::{PlannerEvent, detect_feed_pulses};
use overlay::PreviewSnapshot;
use profile::{PlannerPayload, machine_bounds_from_profile};

// ── JS boundary ───────────────────────────────────────────────────────────
// Inputs that fail to convert read as null; outputs that fail to serialize
// come back as null. Nothing here throws into the viewer.

// Walks a JS value into a record by hand rather than through serde: `undefined`
// properties are dropped (so they read as missing, not as null) and NaN or
// infinite numbers are kept via `number_value` instead of collapsing to null.
fn from_js(value: JsValue) -> Value {
    js_to_value(&value)
}

fn js_to_value(value: &JsValue) -> Value {
    if value.is_null() || value.is_undefined() {
        return Value::Null;
    }
    if let Some(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Some(n) = value.as_f64() {
        return bounds::number_value(n);
    }
    if let Some(s) = value.as_string() {
        return Value::String(s);
    }
    if js_sys::Array::is_array(value) {
        return js_sys::Array::from(value).iter().map(|item| js_to_value(&item)).collect();
    }
    if !value.is_object() {
        return Value::Null;
    }
    let mut record = serde_json::Map::new();
    for entry in js_sys::Object::entries(&js_sys::Object::from(value.clone())).iter() {
        let pair = js_sys::Array::from(&entry);
        let (Some(key), field) = (pair.get(0).as_string(), pair.get(1)) else {
            continue;
        };
        if !field.is_undefined() {
            record.insert(key, js_to_value(&field));
        }
    }
    Value::Object(record)
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

fn js_number(value: JsValue) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

#[wasm_bindgen(js_name = normalizeAxisBounds)]
pub fn normalize_axis_bounds_js(bounds: JsValue) -> JsValue {
    to_js(&normalize_axis_bounds(&from_js(bounds)))
}

#[wasm_bindgen(js_name = comparePlannerToMachineBounds)]
pub fn compare_planner_to_machine_bounds(planner_bounds: JsValue, machine_bounds: JsValue) -> JsValue {
    let result = reconcile(&from_js(planner_bounds), &from_js(machine_bounds));
    if !result.fits {
        console_log!(
            "bounds: missing planner {:?}, missing machine {:?}, exceeding {:?}",
            result.missing_planner_axes,
            result.missing_machine_axes,
            result.exceeding_axes
        );
    }
    to_js(&result)
}

#[wasm_bindgen(js_name = buildTravelEnvelopeBox)]
pub fn build_travel_envelope_box(bounds: JsValue, fallback_span: JsValue) -> JsValue {
    let bounds = from_js(bounds);
    let set = bounds.is_object().then(|| BoundsSet::from_record(&bounds));
    let fallback = FallbackSpan::from_record(&from_js(fallback_span));
    to_js(&build_envelope_box(set.as_ref(), fallback))
}

#[wasm_bindgen(js_name = computeYarnFeedIndices)]
pub fn compute_yarn_feed_indices(events: JsValue, baseline_extrusion: JsValue) -> JsValue {
    let events = from_js(events);
    if !events.is_array() {
        console_log!("feeds: event list is not an array, no pulses");
    }
    let feeds = detect_feed_pulses(&PlannerEvent::list_from_value(&events), js_number(baseline_extrusion));
    to_js(&feeds)
}

#[wasm_bindgen(js_name = machineBoundsFromProfile)]
pub fn machine_bounds_from_profile_js(profile: JsValue) -> JsValue {
    to_js(&machine_bounds_from_profile(&from_js(profile)))
}

#[wasm_bindgen(js_name = previewSnapshot)]
pub fn preview_snapshot(planner: JsValue, machine_profile: JsValue, fallback_span: JsValue) -> JsValue {
    let planner = PlannerPayload::from_value(&from_js(planner));
    let fallback = FallbackSpan::from_record(&from_js(fallback_span));
    to_js(&PreviewSnapshot::compute(&planner, &from_js(machine_profile), fallback))
}

#[wasm_bindgen(js_name = formatFileSize)]
pub fn format_file_size_js(bytes: JsValue) -> Option<String> {
    if bytes.is_undefined() {
        return None;
    }
    format::format_file_size(bounds::coerce_number(&from_js(bytes)))
}

#[wasm_bindgen(js_name = plannerUploadRejection)]
pub fn planner_upload_rejection_js(bytes: f64) -> Option<String> {
    format::planner_upload_rejection(bytes)
}

// ── Frozen configuration ──────────────────────────────────────────────────

#[wasm_bindgen(js_name = fallbackPatternPlannerEvents)]
pub fn fallback_pattern_planner_events() -> JsValue {
    to_js(&fallback_pattern_events())
}

#[wasm_bindgen(js_name = fallbackPatternDefaults)]
pub fn fallback_pattern_defaults() -> JsValue {
    to_js(&FALLBACK_PATTERN_DEFAULTS)
}

#[wasm_bindgen(js_name = fallbackMessages)]
pub fn fallback_messages() -> JsValue {
    to_js(&FALLBACK_MESSAGES)
}

#[wasm_bindgen(js_name = defaultTravelSpan)]
pub fn default_travel_span() -> JsValue {
    to_js(&DEFAULT_TRAVEL_SPAN)
}
