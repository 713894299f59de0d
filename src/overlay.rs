//! Contracts for the collaborators that consume the core's results, plus the
//! snapshot that feeds them on each preview refresh.

use serde::Serialize;
use serde_json::Value;

use crate::bounds::{AxisKey, BoundsSet, ComparisonResult, reconcile_sets};
use crate::config::FALLBACK_MESSAGES;
use crate::envelope::{EnvelopeBox, FallbackSpan, build_envelope_box};
use crate::feeds::{FeedIndices, detect_feed_pulses};
use crate::profile::{PlannerPayload, machine_bounds_from_profile};

/// Status panel side. `fits == false` and an empty feed set are normal states
/// that call for fallback text.
pub trait OverlaySink {
    fn show_comparison(&mut self, comparison: &ComparisonResult);
    fn show_feed_pulses(&mut self, feeds: &FeedIndices, event_count: usize);
}

/// 3D side; must accept an all-fallback box.
pub trait SceneProvider {
    fn size_travel_envelope(&mut self, envelope: &EnvelopeBox);
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSnapshot {
    pub comparison: ComparisonResult,
    pub feeds: FeedIndices,
    pub event_count: usize,
    pub envelope: EnvelopeBox,
    pub status: String,
    pub feed_status: String,
}

impl PreviewSnapshot {
    pub fn compute(planner: &PlannerPayload, machine_profile: &Value, fallback: FallbackSpan) -> Self {
        let planner_set = planner.bounds_set();
        let machine_set = BoundsSet::from_record(&machine_bounds_from_profile(machine_profile));

        let comparison = reconcile_sets(&planner_set, &machine_set);
        let feeds = detect_feed_pulses(&planner.events, planner.extrusion_baseline());
        let envelope = build_envelope_box(
            Some(&machine_set).filter(|set| set.has_travel_axes()),
            fallback,
        );
        let status = comparison_status(&comparison);
        let feed_status = yarn_flow_status(&feeds, planner.events.len());

        console_log!(
            "preview: fits={} exceeding={:?} feeds={}/{}",
            comparison.fits,
            comparison.exceeding_axes,
            feeds.len(),
            planner.events.len()
        );

        PreviewSnapshot {
            comparison,
            feeds,
            event_count: planner.events.len(),
            envelope,
            status,
            feed_status,
        }
    }

    pub fn publish(&self, overlay: &mut dyn OverlaySink, scene: &mut dyn SceneProvider) {
        overlay.show_comparison(&self.comparison);
        overlay.show_feed_pulses(&self.feeds, self.event_count);
        scene.size_travel_envelope(&self.envelope);
    }
}

fn axis_list(axes: &[AxisKey]) -> String {
    axes.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", ")
}

pub fn comparison_status(comparison: &ComparisonResult) -> String {
    let planner_absent = comparison.missing_planner_axes.len() == AxisKey::ALL.len();
    let machine_absent = comparison.missing_machine_axes.len() == AxisKey::ALL.len();
    if planner_absent && machine_absent {
        return FALLBACK_MESSAGES.bounds_comparison_fallback_message.to_string();
    }
    if planner_absent {
        return FALLBACK_MESSAGES.pattern_bounds_fallback_message.to_string();
    }
    if machine_absent {
        return FALLBACK_MESSAGES.machine_profile_envelope_fallback_message.to_string();
    }
    if comparison.missing_machine {
        return format!(
            "{}{}",
            FALLBACK_MESSAGES.machine_profile_envelope_missing_axes_prefix,
            axis_list(&comparison.missing_machine_axes)
        );
    }
    if comparison.missing_planner {
        return format!(
            "Planner bounds incomplete: missing {}",
            axis_list(&comparison.missing_planner_axes)
        );
    }
    if comparison.fits {
        return "Planner bounds fit within the machine travel envelope.".to_string();
    }

    let overruns: Vec<String> = comparison
        .exceeding_axes
        .iter()
        .filter_map(|axis| {
            let detail = comparison.details.get(axis)?;
            let side = match (detail.overrun_low, detail.overrun_high) {
                (true, true) => "both ends",
                (true, false) => "below min",
                _ => "above max",
            };
            Some(format!("{} {side}", axis.as_str()))
        })
        .collect();
    format!("Planner exceeds machine travel: {}", overruns.join(", "))
}

pub fn yarn_flow_status(feeds: &FeedIndices, event_count: usize) -> String {
    if event_count == 0 {
        return FALLBACK_MESSAGES.yarn_flow_status_fallback_message.to_string();
    }
    format!("Yarn flow monitor: {} feed pulses across {event_count} steps", feeds.len())
}

pub fn feed_upcoming_status(feeds: &FeedIndices, step: usize) -> String {
    let next = feeds.upcoming(step, 3);
    if next.is_empty() {
        return FALLBACK_MESSAGES.yarn_flow_upcoming_fallback_message.to_string();
    }
    let steps = next.iter().map(|i| format!("#{}", i + 1)).collect::<Vec<_>>();
    format!("Next feed pulses: {}", steps.join(", "))
}

pub fn feed_queue_status(feeds: &FeedIndices, step: usize) -> String {
    if feeds.is_empty() {
        return FALLBACK_MESSAGES.yarn_flow_queue_fallback_message.to_string();
    }
    let next = feeds
        .upcoming(step, 3)
        .iter()
        .map(|i| format!("#{}", i + 1))
        .collect::<Vec<_>>();
    if next.is_empty() {
        return format!("Remaining feed pulses: 0 of {}", feeds.len());
    }
    format!(
        "Remaining feed pulses: {} of {} (next {})",
        feeds.remaining_after(step),
        feeds.len(),
        next.join(", ")
    )
}
