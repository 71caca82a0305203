use crate::utils::config::{DEFAULT_ATTRIBUTION_ROWS, DEFAULT_CPU_THROTTLING, DEFAULT_DEVICE};
use std::path::PathBuf;

/// Arguments for a measurement run
///
/// **Public** - used by the `reflow-trace` binary to construct from CLI args
#[derive(Debug, Clone)]
pub struct MeasureArgs {
    /// Page to measure
    pub url: String,

    /// Show the browser window instead of running headless
    pub show_browser: bool,

    /// Scroll to the bottom after load to provoke below-the-fold shifts
    pub scroll_down: bool,

    /// CPU slowdown factor (1.0 = no throttling)
    pub cpu_throttling: f64,

    /// Key into the known-device table
    pub device: String,

    /// Directory the timestamped results directory is created in
    pub output_root: PathBuf,

    /// Print at most this many reflow locations
    pub top_reflows: Option<usize>,

    /// Also write `report.json` into the results directory
    pub json_report: bool,
}

impl Default for MeasureArgs {
    fn default() -> Self {
        Self {
            url: String::new(),
            show_browser: false,
            scroll_down: true,
            cpu_throttling: DEFAULT_CPU_THROTTLING,
            device: DEFAULT_DEVICE.to_string(),
            output_root: PathBuf::from("."),
            top_reflows: None,
            json_report: false,
        }
    }
}

/// Arguments for the offline hydration analysis
#[derive(Debug, Clone)]
pub struct HydrationArgs {
    /// Source-mapped trace, usually `profile.mapped.json`
    pub trace: PathBuf,

    /// Optional analysis settings (TOML)
    pub config: Option<PathBuf>,

    /// Path to write a flamegraph SVG of the hydration window
    pub flamegraph: Option<PathBuf>,

    /// Rows printed per ranking
    pub top: usize,
}

impl Default for HydrationArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::new(),
            config: None,
            flamegraph: None,
            top: DEFAULT_ATTRIBUTION_ROWS,
        }
    }
}
