//! Browser trace parsing.
//!
//! A trace file is either a bare JSON array of events or an object with a
//! `traceEvents` field. Every reader in this crate goes through
//! [`trace_event_values`] so both shapes behave identically.

use crate::utils::error::TraceError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A single recorded browser engine event
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceEvent {
    /// Event kind, e.g. `UpdateLayoutTree` or `ProfileChunk`
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub cat: String,

    /// Phase (`X` complete, `B`/`E` begin/end, `P` sample, ...)
    #[serde(default)]
    pub ph: String,

    /// Timestamp in microseconds
    #[serde(default)]
    pub ts: f64,

    /// Duration in microseconds (complete events only)
    #[serde(default)]
    pub dur: Option<f64>,

    #[serde(default)]
    pub pid: Option<i64>,

    #[serde(default)]
    pub tid: Option<i64>,

    /// Correlation id (used by Profile / ProfileChunk events)
    #[serde(default)]
    pub id: Option<String>,

    /// Opaque payload; may embed a stack trace or a CPU profile
    #[serde(default)]
    pub args: Value,
}

/// A source code location as it appears in trace stack traces
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub line_number: u32,

    #[serde(default)]
    pub column_number: u32,

    #[serde(default)]
    pub function_name: String,
}

impl TraceEvent {
    /// Duration in microseconds, zero for instant events
    pub fn duration(&self) -> f64 {
        self.dur.unwrap_or(0.0)
    }

    /// End timestamp in microseconds
    pub fn end(&self) -> f64 {
        self.ts + self.duration()
    }

    /// Stack trace recorded when the event began (`args.beginData.stackTrace`)
    pub fn begin_stack_trace(&self) -> Option<&Vec<Value>> {
        self.args
            .get("beginData")?
            .get("stackTrace")?
            .as_array()
            .filter(|frames| !frames.is_empty())
    }

    /// First frame of the begin-data stack trace, if the event has one
    pub fn begin_stack_frame(&self) -> Option<StackFrame> {
        let first = self.begin_stack_trace()?.first()?;
        StackFrame::deserialize(first).ok()
    }

    /// True when the event carries a non-empty begin-data stack trace
    pub fn has_stack_trace(&self) -> bool {
        self.begin_stack_trace().is_some()
    }

    /// Embedded CPU profile (`args.data.cpuProfile`), present on ProfileChunk events
    pub fn cpu_profile(&self) -> Option<&Value> {
        self.args.get("data")?.get("cpuProfile")
    }
}

/// Borrow the event list out of either accepted trace shape
///
/// **Public** - shared by the aggregator, the source mapper and the analyzer
///
/// # Errors
/// * `TraceError::InvalidFormat` - neither an array nor an object with `traceEvents`
pub fn trace_event_values(raw_trace: &Value) -> Result<&Vec<Value>, TraceError> {
    match raw_trace {
        Value::Array(events) => Ok(events),
        Value::Object(obj) => obj
            .get("traceEvents")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                TraceError::InvalidFormat("object trace is missing a traceEvents array".to_string())
            }),
        _ => Err(TraceError::InvalidFormat(
            "Trace must be a JSON array or an object with traceEvents".to_string(),
        )),
    }
}

/// Mutable counterpart of [`trace_event_values`]
pub fn trace_event_values_mut(raw_trace: &mut Value) -> Result<&mut Vec<Value>, TraceError> {
    match raw_trace {
        Value::Array(events) => Ok(events),
        Value::Object(obj) => obj
            .get_mut("traceEvents")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| {
                TraceError::InvalidFormat("object trace is missing a traceEvents array".to_string())
            }),
        _ => Err(TraceError::InvalidFormat(
            "Trace must be a JSON array or an object with traceEvents".to_string(),
        )),
    }
}

/// Parse every event of a raw trace
///
/// Malformed events are logged and skipped rather than failing the whole trace.
pub fn parse_events(raw_trace: &Value) -> Result<Vec<TraceEvent>, TraceError> {
    let values = trace_event_values(raw_trace)?;
    let mut events = Vec::with_capacity(values.len());

    for (index, value) in values.iter().enumerate() {
        match TraceEvent::deserialize(value) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping malformed trace event {}: {}", index, e),
        }
    }

    debug!("Parsed {} of {} trace events", events.len(), values.len());
    Ok(events)
}

/// Read a trace file from disk without interpreting it
pub fn read_trace_file(path: impl AsRef<Path>) -> Result<Value, TraceError> {
    let path = path.as_ref();
    debug!("Reading trace from: {}", path.display());

    let file = File::open(path)?;
    let raw: Value = serde_json::from_reader(BufReader::new(file))?;

    // Validate the shape early so callers get a format error, not an empty report
    trace_event_values(&raw)?;
    Ok(raw)
}
