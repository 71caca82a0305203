//! Layout shift tracking.
//!
//! [`LayoutShiftTracker::install`] injects the observer before navigation;
//! [`extract_tracking_result`] consumes the tracker after the trace has been
//! captured and returns the shift records.

pub mod extractor;
pub mod tracker;

pub use extractor::{capture_screenshots, extract_tracking_result, screenshot_file_name};
pub use tracker::{
    build_records, tracker_source, LayoutShiftTracker, RawShiftEntry, RawShiftSource, Rect,
    ShiftTag,
};
