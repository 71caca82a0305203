//! Output writers and terminal rendering.
//!
//! This module handles everything a run leaves behind:
//! - The timestamped results directory
//! - Pretty-printed JSON (mapped trace, report)
//! - SVG flamegraphs
//! - Console reports

pub mod json;
pub mod report;
pub mod results;
pub mod svg;

// Re-export main functions
pub use json::{read_report, write_json_pretty, write_report};
pub use report::{
    describe_movement, format_location, format_reflow, render_attribution, render_layout_shifts,
    render_measurement, render_reflows,
};
pub use results::{create_results_dir, results_dir_name, ResultsDir};
pub use svg::write_svg;

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
