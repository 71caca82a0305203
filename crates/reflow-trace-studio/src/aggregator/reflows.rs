//! Aggregate style recalculations by the source location that triggered them.
//!
//! Every `UpdateLayoutTree` event carrying a begin-data stack trace is folded
//! into one entry per `url:line:column`. Events without a stack trace are
//! dropped: nothing in application code can be blamed for them.

use crate::parser::schema::{location_key, ReflowEntry};
use crate::parser::trace::{parse_events, TraceEvent};
use crate::utils::config::STYLE_RECALC_EVENT;
use crate::utils::error::TraceError;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// Aggregate a (source-mapped) raw trace into ranked reflow entries
///
/// **Public** - main entry point for reflow aggregation
///
/// # Arguments
/// * `raw_trace` - Trace as a bare event array or a `{traceEvents: [...]}` object
///
/// # Returns
/// One entry per code location, sorted by total duration (descending)
pub fn aggregate_reflows(raw_trace: &Value) -> Result<Vec<ReflowEntry>, TraceError> {
    let events = parse_events(raw_trace)?;
    Ok(aggregate_reflow_events(&events))
}

/// Aggregate already-parsed events
pub fn aggregate_reflow_events(events: &[TraceEvent]) -> Vec<ReflowEntry> {
    let mut entries: Vec<ReflowEntry> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for event in events.iter().filter(|e| e.name == STYLE_RECALC_EVENT) {
        let Some(frame) = event.begin_stack_frame() else {
            skipped += 1;
            continue;
        };

        let key = location_key(&frame.url, frame.line_number, frame.column_number);
        match index_by_key.get(&key) {
            Some(&index) => {
                let entry = &mut entries[index];
                entry.duration += event.duration();
                entry.count += 1;
            }
            None => {
                index_by_key.insert(key, entries.len());
                entries.push(ReflowEntry {
                    url: frame.url,
                    function_name: frame.function_name,
                    line_number: frame.line_number,
                    column_number: frame.column_number,
                    duration: event.duration(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal durations
    entries.sort_by(|a, b| b.duration.total_cmp(&a.duration));

    debug!(
        "Aggregated {} reflow locations ({} events without stack trace skipped)",
        entries.len(),
        skipped
    );
    entries
}

/// Total reflow time across entries, in microseconds
pub fn total_reflow_time(entries: &[ReflowEntry]) -> f64 {
    entries.iter().map(|e| e.duration).sum()
}
