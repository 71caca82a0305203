//! Report data types.
//!
//! These are the findings computed once per run and written to `report.json`.

use serde::{Deserialize, Serialize};

/// Cumulative style-recalculation cost for one source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowEntry {
    pub url: String,

    /// First function name seen at this location
    pub function_name: String,

    pub line_number: u32,
    pub column_number: u32,

    /// Summed duration in microseconds
    pub duration: f64,

    /// Number of style recalculations folded into this entry
    pub count: u64,
}

impl ReflowEntry {
    /// Aggregation key: `url:line:column`
    pub fn key(&self) -> String {
        location_key(&self.url, self.line_number, self.column_number)
    }

    /// Total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.duration / 1000.0
    }
}

/// Build the `url:line:column` aggregation key
pub fn location_key(url: &str, line: u32, column: u32) -> String {
    format!("{}:{}:{}", url, line, column)
}

/// One layout shift that was not caused by recent user input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutShiftRecord {
    /// Shift score as reported by the browser
    pub value: f64,

    pub diffs: Vec<NodeDiff>,
}

/// Position/size delta (current minus previous) of one shifted DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDiff {
    /// Parent and node tag/class names, e.g. `div.list > li.item`
    pub node_name: String,

    /// Locator relative to the nearest ancestor with an id
    pub x_path: String,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything a measurement run produced, as written to `report.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementReport {
    pub url: String,
    pub device: String,
    pub generated_at: String,
    pub reflows: Vec<ReflowEntry>,
    pub layout_shifts: Vec<LayoutShiftRecord>,
}
