//! Pull tracked layout shifts out of the page and screenshot the shifted nodes.

use super::tracker::{build_records, LayoutShiftTracker};
use crate::browser::{NodeHandle, PageSession};
use crate::parser::schema::LayoutShiftRecord;
use crate::utils::config::SHIFT_MARKER_ATTRIBUTE;
use crate::utils::error::TrackingError;
use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use std::thread;

/// Finish a tracking session
///
/// **Public** - called once trace capture has stopped
///
/// # Steps
/// 1. Collect the buffered shifts from the page
/// 2. Tag every implicated node with `data-cls-shift-id`
/// 3. Tear the tracker down
/// 4. Screenshot every tagged node that is still attached, concurrently
///
/// # Returns
/// The shift records; screenshots are written as a side effect
pub fn extract_tracking_result(
    tracker: LayoutShiftTracker,
    page: &dyn PageSession,
    screenshot_dir: &Path,
) -> Result<Vec<LayoutShiftRecord>, TrackingError> {
    let raw = tracker.collect(page)?;
    let (records, tags) = build_records(&raw);
    debug!(
        "{} of {} layout shifts kept ({} nodes)",
        records.len(),
        raw.len(),
        tags.len()
    );

    tracker.tag(page, SHIFT_MARKER_ATTRIBUTE, &tags)?;
    tracker.teardown(page)?;

    if !tags.is_empty() {
        let nodes = page
            .query_marked_nodes(SHIFT_MARKER_ATTRIBUTE)
            .map_err(|e| TrackingError::EvaluationFailed(e.to_string()))?;
        let written = capture_screenshots(&nodes, screenshot_dir)?;
        info!(
            "Captured {} screenshots for {} shifted nodes",
            written,
            tags.len()
        );
    }

    Ok(records)
}

/// Screenshot every node concurrently into `cls-<id>.png`
///
/// A node that cannot be captured is skipped without affecting the others.
///
/// # Returns
/// Number of screenshots written
pub fn capture_screenshots(
    nodes: &[Box<dyn NodeHandle>],
    screenshot_dir: &Path,
) -> Result<usize, TrackingError> {
    fs::create_dir_all(screenshot_dir)?;

    let written = thread::scope(|scope| {
        let workers: Vec<_> = nodes
            .iter()
            .map(|node| scope.spawn(move || save_screenshot(node.as_ref(), screenshot_dir)))
            .collect();

        // A panicked worker counts as a failed screenshot
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap_or(false))
            .filter(|saved| *saved)
            .count()
    });

    Ok(written)
}

fn save_screenshot(node: &dyn NodeHandle, screenshot_dir: &Path) -> bool {
    let Some(png) = node.try_screenshot() else {
        debug!("No screenshot for node {}", node.marker());
        return false;
    };

    let path = screenshot_dir.join(screenshot_file_name(node.marker()));
    match fs::write(&path, png) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write {}: {}", path.display(), e);
            false
        }
    }
}

/// `cls-<shiftIndex>-<nodeIndex>.png`
pub fn screenshot_file_name(marker: &str) -> String {
    format!("cls-{}.png", marker)
}
