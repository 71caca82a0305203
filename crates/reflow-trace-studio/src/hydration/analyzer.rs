//! End-to-end hydration analysis over parsed trace events.

use super::attribution::{attribute, Attribution, FrameClassifier};
use super::config::AnalysisConfig;
use super::cpu_profile::{build_call_tree, CallTreeNode};
use super::window::{find_hydration_event, hydration_interval, reflow_windows, wraps_hydration, TimeWindow};
use super::HydrationError;
use crate::parser::trace::TraceEvent;
use log::{debug, info};

/// Hydration window and the call tree recorded inside it
#[derive(Debug, Clone)]
pub struct HydrationAnalysis {
    /// Index of the event that revealed the hydration call
    pub marker_index: usize,
    pub marker_timestamp: f64,
    pub window: TimeWindow,
    pub call_tree: CallTreeNode,
}

impl HydrationAnalysis {
    pub fn attribute<'a>(&'a self, classifier: &dyn FrameClassifier) -> Attribution<'a> {
        attribute(&self.call_tree, classifier)
    }
}

/// Find hydration, bound it by stackless reflows and build its call tree
///
/// **Public** - main entry point of the offline analyzer
///
/// # Arguments
/// * `events` - Parsed events of a source-mapped trace
/// * `config` - Marker suffixes and attribution heuristics
///
/// # Errors
/// * `MarkerNotFound` - No CPU profile node carries a hydration marker
/// * `NoWindowBefore` / `NoWindowAfter` - Hydration is not bracketed by reflows
pub fn analyze_hydration(
    events: &[TraceEvent],
    config: &AnalysisConfig,
) -> Result<HydrationAnalysis, HydrationError> {
    let marker_index = find_hydration_event(events, &config.hydration_markers)
        .ok_or_else(|| HydrationError::MarkerNotFound(config.hydration_markers.clone()))?;
    let marker_timestamp = events[marker_index].ts;
    debug!(
        "Hydration marker found at event {} (ts {})",
        marker_index, marker_timestamp
    );

    let windows = reflow_windows(events, wraps_hydration);
    debug!("{} stackless reflows in trace", windows.len());

    let window = hydration_interval(&windows, marker_timestamp)?;
    info!(
        "Hydration window: {:.2}ms ({} → {})",
        window.duration() / 1000.0,
        window.start,
        window.end
    );

    let call_tree = build_call_tree(events, window.start, window.end);

    Ok(HydrationAnalysis {
        marker_index,
        marker_timestamp,
        window,
        call_tree,
    })
}
