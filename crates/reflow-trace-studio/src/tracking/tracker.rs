//! In-page layout-shift instrumentation.
//!
//! The observer itself runs inside the page (see `layout_shift_tracker.js`).
//! It buffers raw entries, including ones caused by recent input; the
//! conversion into [`LayoutShiftRecord`]s and the input filter happen here so
//! shift indices stay consistent between records and screenshot names.

use crate::browser::PageSession;
use crate::parser::schema::{LayoutShiftRecord, NodeDiff};
use crate::utils::error::TrackingError;
use log::{debug, info};
use serde::Deserialize;

const TRACKER_SOURCE: &str = include_str!("layout_shift_tracker.js");

/// Page global holding the tracker's buffer
pub const DEFAULT_TRACKER_HANDLE: &str = "__reflowTraceLayoutShifts";

/// A rectangle as serialized by the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// One region contributing to a shift, as buffered by the page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShiftSource {
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub x_path: String,
    #[serde(default)]
    pub previous_rect: Option<Rect>,
    #[serde(default)]
    pub current_rect: Option<Rect>,
}

/// A layout-shift performance entry, as buffered by the page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShiftEntry {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub had_recent_input: bool,
    /// Absent on some entries; treated as empty
    #[serde(default)]
    pub sources: Vec<RawShiftSource>,
}

impl RawShiftSource {
    /// Delta of the current rect minus the previous rect, per axis
    pub fn to_diff(&self) -> NodeDiff {
        let previous = self.previous_rect.unwrap_or_default();
        let current = self.current_rect.unwrap_or_default();

        NodeDiff {
            node_name: self.node_name.clone(),
            x_path: self.x_path.clone(),
            x: current.x - previous.x,
            y: current.y - previous.y,
            width: current.width - previous.width,
            height: current.height - previous.height,
        }
    }
}

/// Instruction to mark one shifted node in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTag {
    /// Index into the raw buffer
    pub entry_index: usize,
    pub source_index: usize,
    /// `<shiftIndex>-<nodeIndex>`, shift index counted over kept records only
    pub id: String,
}

/// Turn the raw buffer into shift records plus the tags for their nodes
///
/// Entries with `hadRecentInput` are dropped.
pub fn build_records(raw: &[RawShiftEntry]) -> (Vec<LayoutShiftRecord>, Vec<ShiftTag>) {
    let mut records = Vec::new();
    let mut tags = Vec::new();

    for (entry_index, entry) in raw.iter().enumerate() {
        if entry.had_recent_input {
            continue;
        }

        let shift_index = records.len();
        tags.extend(
            (0..entry.sources.len()).map(|source_index| ShiftTag {
                entry_index,
                source_index,
                id: screenshot_id(shift_index, source_index),
            }),
        );

        records.push(LayoutShiftRecord {
            value: entry.value,
            diffs: entry.sources.iter().map(RawShiftSource::to_diff).collect(),
        });
    }

    (records, tags)
}

/// Composite id shared by the marker attribute and the screenshot file name
pub fn screenshot_id(shift_index: usize, node_index: usize) -> String {
    format!("{}-{}", shift_index, node_index)
}

/// An installed tracker
///
/// Returned by [`LayoutShiftTracker::install`] and consumed by extraction, so a
/// session can only be torn down once.
#[derive(Debug)]
pub struct LayoutShiftTracker {
    handle: String,
}

impl LayoutShiftTracker {
    /// Install the observer into every document the page loads from now on
    pub fn install(page: &dyn PageSession) -> Result<Self, TrackingError> {
        Self::install_with_handle(page, DEFAULT_TRACKER_HANDLE)
    }

    pub fn install_with_handle(page: &dyn PageSession, handle: &str) -> Result<Self, TrackingError> {
        page.install_script(&tracker_source(handle))
            .map_err(|e| TrackingError::EvaluationFailed(e.to_string()))?;

        info!("Layout shift tracking installed");
        Ok(Self {
            handle: handle.to_string(),
        })
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Pull the buffered entries out of the page
    pub(crate) fn collect(&self, page: &dyn PageSession) -> Result<Vec<RawShiftEntry>, TrackingError> {
        let value = evaluate(page, &self.collect_expression())?;
        if value.is_null() {
            return Err(TrackingError::NotInstalled);
        }

        let entries: Vec<RawShiftEntry> = serde_json::from_value(value)?;
        debug!("Collected {} layout shift entries", entries.len());
        Ok(entries)
    }

    /// Mark shifted nodes with `attribute` so they can be found again
    pub(crate) fn tag(
        &self,
        page: &dyn PageSession,
        attribute: &str,
        tags: &[ShiftTag],
    ) -> Result<(), TrackingError> {
        if tags.is_empty() {
            return Ok(());
        }
        evaluate(page, &self.tag_expression(attribute, tags))?;
        Ok(())
    }

    /// Stop observing; consumes the session
    pub(crate) fn teardown(self, page: &dyn PageSession) -> Result<(), TrackingError> {
        evaluate(page, &self.teardown_expression())?;
        debug!("Layout shift tracking torn down");
        Ok(())
    }

    pub fn collect_expression(&self) -> String {
        format!("window.{0} ? window.{0}.collect() : null", self.handle)
    }

    pub fn tag_expression(&self, attribute: &str, tags: &[ShiftTag]) -> String {
        let triples: Vec<serde_json::Value> = tags
            .iter()
            .map(|t| serde_json::json!([t.entry_index, t.source_index, t.id]))
            .collect();

        format!(
            "window.{}.tag({}, {})",
            self.handle,
            serde_json::Value::from(attribute),
            serde_json::Value::Array(triples)
        )
    }

    pub fn teardown_expression(&self) -> String {
        format!("window.{0} && window.{0}.teardown()", self.handle)
    }
}

/// The page-side script with its global handle filled in
pub fn tracker_source(handle: &str) -> String {
    TRACKER_SOURCE.replace("__HANDLE__", handle)
}

fn evaluate(page: &dyn PageSession, expression: &str) -> Result<serde_json::Value, TrackingError> {
    page.evaluate(expression, false)
        .map_err(|e| TrackingError::EvaluationFailed(e.to_string()))
}
