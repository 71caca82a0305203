//! Locating hydration and the reflows that bracket it.

use super::HydrationError;
use crate::parser::trace::TraceEvent;
use crate::utils::config::STYLE_RECALC_EVENT;
use serde_json::Value;

/// A closed time interval in trace microseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn of(event: &TraceEvent) -> Self {
        Self::new(event.ts, event.end())
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Heuristic: a style recalculation with no JS stack trace was triggered by
/// the engine around hydration rather than by application code.
pub fn wraps_hydration(event: &TraceEvent) -> bool {
    event.name == STYLE_RECALC_EVENT && !event.has_stack_trace()
}

/// Windows of every event accepted by `policy`, ordered by start time
pub fn reflow_windows<F>(events: &[TraceEvent], policy: F) -> Vec<TimeWindow>
where
    F: Fn(&TraceEvent) -> bool,
{
    let mut windows: Vec<TimeWindow> = events
        .iter()
        .filter(|e| policy(e))
        .map(TimeWindow::of)
        .collect();
    windows.sort_by(|a, b| a.start.total_cmp(&b.start));
    windows
}

/// Interval between the last reflow that ends before `marker_ts` and the next one
///
/// **Public** - bounds the hydration attribution window
///
/// `windows` must be ordered by start, as returned by [`reflow_windows`]. A
/// window that spans the marker is never chosen as the bracket before it.
///
/// # Errors
/// * `NoWindowBefore` - no window ends before the marker
/// * `NoWindowAfter` - the window before the marker is the last one
pub fn hydration_interval(
    windows: &[TimeWindow],
    marker_ts: f64,
) -> Result<TimeWindow, HydrationError> {
    let before = windows
        .iter()
        .rposition(|w| w.end < marker_ts)
        .ok_or(HydrationError::NoWindowBefore(marker_ts))?;
    let after = windows
        .get(before + 1)
        .ok_or(HydrationError::NoWindowAfter(marker_ts))?;

    Ok(TimeWindow::new(windows[before].end, after.start))
}

/// Index of the first event whose CPU profile has a node named with a marker suffix
pub fn find_hydration_event(events: &[TraceEvent], markers: &[String]) -> Option<usize> {
    events.iter().position(|event| {
        event
            .cpu_profile()
            .and_then(|profile| profile.get("nodes"))
            .and_then(Value::as_array)
            .is_some_and(|nodes| {
                nodes.iter().any(|node| {
                    node.pointer("/callFrame/functionName")
                        .and_then(Value::as_str)
                        .is_some_and(|name| markers.iter().any(|m| name.ends_with(m.as_str())))
                })
            })
    })
}
