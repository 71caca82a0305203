//! Trace parsing and report schema definitions.
//!
//! This module handles:
//! - Reading raw browser traces (array or `traceEvents` object)
//! - Extracting stack frames from trace events
//! - Source-mapping embedded frames
//! - Defining report data types

pub mod schema;
pub mod source_map;
pub mod trace;

// Re-export main types
pub use schema::{LayoutShiftRecord, MeasurementReport, NodeDiff, ReflowEntry};
pub use source_map::{load_mapped_profile, SourceMapper};
pub use trace::{parse_events, read_trace_file, trace_event_values, StackFrame, TraceEvent};
