//! Yarn-feed pulse detection over a planner event stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bounds::coerce_number;
use crate::config::FEED_DELTA_TOLERANCE;

/// One step of a planner motion plan. Index in the stream is its temporal position.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PlannerEvent {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub extrusion: Option<f64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl PlannerEvent {
    /// Lenient conversion: fields that do not coerce to a finite number become
    /// `None` (a `null` extrusion reads as 0), and non-objects become an empty
    /// event so stream indices stay aligned.
    pub fn from_value(value: &Value) -> Self {
        let Some(record) = value.as_object() else {
            return PlannerEvent::default();
        };
        let number = |key: &str| {
            record
                .get(key)
                .map(coerce_number)
                .filter(|n| n.is_finite())
        };
        PlannerEvent {
            comment: record.get("comment").and_then(Value::as_str).map(str::to_string),
            extrusion: number("extrusion"),
            x: number("x"),
            y: number("y"),
            z: number("z"),
        }
    }

    pub fn list_from_value(value: &Value) -> Vec<PlannerEvent> {
        value
            .as_array()
            .map(|items| items.iter().map(PlannerEvent::from_value).collect())
            .unwrap_or_default()
    }

    fn mentions_feed(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains("feed"))
    }
}

/// Strictly ascending, duplicate-free event indices flagged as feed pulses.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FeedIndices(Vec<usize>);

impl FeedIndices {
    fn mark(&mut self, index: usize) {
        if self.0.last().is_none_or(|&last| last < index) {
            self.0.push(index);
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    /// Pulses strictly after `step`.
    pub fn remaining_after(&self, step: usize) -> usize {
        self.0.len() - self.0.partition_point(|&i| i <= step)
    }

    /// Next `limit` pulses strictly after `step`.
    pub fn upcoming(&self, step: usize, limit: usize) -> &[usize] {
        let start = self.0.partition_point(|&i| i <= step);
        let end = (start + limit).min(self.0.len());
        &self.0[start..end]
    }
}

pub fn detect_feed_pulses(events: &[PlannerEvent], baseline_extrusion: Option<f64>) -> FeedIndices {
    let mut feeds = FeedIndices::default();
    let mut previous = baseline_extrusion.filter(|b| b.is_finite());

    for (index, event) in events.iter().enumerate() {
        if event.mentions_feed() {
            feeds.mark(index);
        }

        // Missing extrusion leaves the running value untouched.
        let Some(extrusion) = event.extrusion.filter(|e| e.is_finite()) else {
            continue;
        };
        if let Some(prev) = previous {
            let delta = extrusion - prev;
            if delta.is_finite() && delta > FEED_DELTA_TOLERANCE {
                feeds.mark(index);
            }
        }
        previous = Some(extrusion);
    }

    feeds
}
