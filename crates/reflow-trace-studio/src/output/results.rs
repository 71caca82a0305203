//! Per-run results directory.

use crate::utils::config::{
    MAPPED_PROFILE_FILE, RAW_PROFILE_FILE, REPORT_FILE, RESULTS_DIR_PREFIX, SCREENSHOTS_DIR,
};
use crate::utils::error::OutputError;
use chrono::{DateTime, TimeZone};
use log::debug;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Paths of one measurement run's artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsDir {
    pub root: PathBuf,
    pub screenshots: PathBuf,
}

impl ResultsDir {
    /// Trace as captured from the browser
    pub fn raw_profile(&self) -> PathBuf {
        self.root.join(RAW_PROFILE_FILE)
    }

    /// Trace with stack frames rewritten to original sources
    pub fn mapped_profile(&self) -> PathBuf {
        self.root.join(MAPPED_PROFILE_FILE)
    }

    pub fn report(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }
}

/// `measurements-` followed by the timestamp, each run of non-digits as one dash
///
/// # Example
/// ```ignore
/// // 2024-03-05 14:07:09.042 local time
/// assert_eq!(results_dir_name(&now), "measurements-2024-03-05-14-07-09-042");
/// ```
pub fn results_dir_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut stamp = String::new();
    for c in now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().chars() {
        if c.is_ascii_digit() {
            stamp.push(c);
        } else if !stamp.is_empty() && !stamp.ends_with('-') {
            stamp.push('-');
        }
    }
    format!("{}{}", RESULTS_DIR_PREFIX, stamp.trim_end_matches('-'))
}

/// Create the results directory and its screenshots folder under `base`
///
/// # Errors
/// * `OutputError::InvalidPath` - A directory could not be created
pub fn create_results_dir<Tz>(base: &Path, now: &DateTime<Tz>) -> Result<ResultsDir, OutputError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let root = base.join(results_dir_name(now));
    let screenshots = root.join(SCREENSHOTS_DIR);

    std::fs::create_dir_all(&screenshots).map_err(|e| {
        OutputError::InvalidPath(format!(
            "Cannot create directory {}: {}",
            screenshots.display(),
            e
        ))
    })?;
    debug!("Results directory: {}", root.display());

    Ok(ResultsDir { root, screenshots })
}
