//! Aggregation of trace data into ranked findings.
//!
//! This module transforms source-mapped traces into:
//! - Reflow hotspots (style recalculation time per source location)

pub mod reflows;

// Re-export main functions
pub use reflows::{aggregate_reflow_events, aggregate_reflows, total_reflow_time};
