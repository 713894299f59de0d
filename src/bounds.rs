//! Axis bounds normalization and planner/machine envelope reconciliation.
//!
//! Planner exports and machine profiles drift independently, so every lookup
//! here tolerates aliased field names and degrades to "absent" instead of
//! failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const MIN_ALIASES: [&str; 4] = ["min", "min_mm", "minimum", "low"];
const MAX_ALIASES: [&str; 4] = ["max", "max_mm", "maximum", "high"];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.max + self.min) / 2.0
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AxisKey {
    X,
    Y,
    Z,
    E,
}

impl AxisKey {
    pub const ALL: [AxisKey; 4] = [AxisKey::X, AxisKey::Y, AxisKey::Z, AxisKey::E];

    pub fn as_str(self) -> &'static str {
        match self {
            AxisKey::X => "x",
            AxisKey::Y => "y",
            AxisKey::Z => "z",
            AxisKey::E => "e",
        }
    }

    /// Record keys that may carry this axis, in priority order.
    pub fn record_keys(self) -> &'static [&'static str] {
        match self {
            AxisKey::X => &["x"],
            AxisKey::Y => &["y"],
            AxisKey::Z => &["z"],
            AxisKey::E => &["e", "extrusion"],
        }
    }
}

/// `Number()`-style coercion for values coming out of a parsed payload.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b { 1.0 } else { 0.0 }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric_text(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

// StringToNumber: decimal with optional sign, unsigned 0x/0o/0b integers,
// and the spelled-out infinities. Anything else is NaN.
fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
    }
    // Rust also accepts "inf"/"nan" spellings, which Number() rejects.
    if trimmed.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Carries a number into a record without losing non-finite values, which
/// `serde_json` cannot store as numbers. `coerce_number` reads them back.
pub fn number_value(n: f64) -> Value {
    match serde_json::Number::from_f64(n) {
        Some(number) => Value::Number(number),
        None if n.is_nan() => Value::String("NaN".to_string()),
        None if n > 0.0 => Value::String("Infinity".to_string()),
        None => Value::String("-Infinity".to_string()),
    }
}

// First alias that is present and not null.
fn first_defined<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|v| !v.is_null())
}

pub fn normalize_axis_bounds(value: &Value) -> Option<AxisBounds> {
    let record = value.as_object()?;
    let min = first_defined(record, &MIN_ALIASES).map_or(f64::NAN, coerce_number);
    let max = first_defined(record, &MAX_ALIASES).map_or(f64::NAN, coerce_number);
    if !min.is_finite() || !max.is_finite() || max < min {
        return None;
    }
    Some(AxisBounds { min, max })
}

/// Normalized bounds per axis; `None` marks an axis the record does not describe.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundsSet {
    pub x: Option<AxisBounds>,
    pub y: Option<AxisBounds>,
    pub z: Option<AxisBounds>,
    pub e: Option<AxisBounds>,
}

impl BoundsSet {
    pub fn from_record(record: &Value) -> Self {
        let mut set = BoundsSet::default();
        let Some(record) = record.as_object() else {
            return set;
        };
        for axis in AxisKey::ALL {
            let resolved = axis
                .record_keys()
                .iter()
                .filter_map(|key| record.get(*key))
                .find_map(normalize_axis_bounds);
            set.set(axis, resolved);
        }
        set
    }

    pub fn get(&self, axis: AxisKey) -> Option<AxisBounds> {
        match axis {
            AxisKey::X => self.x,
            AxisKey::Y => self.y,
            AxisKey::Z => self.z,
            AxisKey::E => self.e,
        }
    }

    pub fn set(&mut self, axis: AxisKey, bounds: Option<AxisBounds>) {
        match axis {
            AxisKey::X => self.x = bounds,
            AxisKey::Y => self.y = bounds,
            AxisKey::Z => self.z = bounds,
            AxisKey::E => self.e = bounds,
        }
    }

    /// True when at least one of the travel axes (x/y/z) resolved.
    pub fn has_travel_axes(&self) -> bool {
        self.x.is_some() || self.y.is_some() || self.z.is_some()
    }

    pub fn missing_axes(&self) -> Vec<AxisKey> {
        AxisKey::ALL
            .into_iter()
            .filter(|axis| self.get(*axis).is_none())
            .collect()
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AxisComparison {
    pub planner: AxisBounds,
    pub machine: AxisBounds,
    pub overrun_low: bool,
    pub overrun_high: bool,
}

impl AxisComparison {
    pub fn exceeds(&self) -> bool {
        self.overrun_low || self.overrun_high
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub missing_planner: bool,
    pub missing_machine: bool,
    pub missing_planner_axes: Vec<AxisKey>,
    pub missing_machine_axes: Vec<AxisKey>,
    pub fits: bool,
    pub exceeding_axes: Vec<AxisKey>,
    pub details: BTreeMap<AxisKey, AxisComparison>,
}

pub fn reconcile(planner_bounds: &Value, machine_bounds: &Value) -> ComparisonResult {
    reconcile_sets(
        &BoundsSet::from_record(planner_bounds),
        &BoundsSet::from_record(machine_bounds),
    )
}

pub fn reconcile_sets(planner: &BoundsSet, machine: &BoundsSet) -> ComparisonResult {
    let missing_planner_axes = planner.missing_axes();
    let missing_machine_axes = machine.missing_axes();

    let mut exceeding_axes = Vec::new();
    let mut details = BTreeMap::new();
    for axis in AxisKey::ALL {
        // Axes missing on either side are reported, never compared.
        let (Some(p), Some(m)) = (planner.get(axis), machine.get(axis)) else {
            continue;
        };
        let cmp = AxisComparison {
            planner: p,
            machine: m,
            overrun_low: p.min < m.min,
            overrun_high: p.max > m.max,
        };
        if cmp.exceeds() {
            exceeding_axes.push(axis);
        }
        details.insert(axis, cmp);
    }

    let missing_planner = !missing_planner_axes.is_empty();
    let missing_machine = !missing_machine_axes.is_empty();
    ComparisonResult {
        missing_planner,
        missing_machine,
        fits: !missing_planner && !missing_machine && exceeding_axes.is_empty(),
        missing_planner_axes,
        missing_machine_axes,
        exceeding_axes,
        details,
    }
}
