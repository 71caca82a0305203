//! Configuration and constants for the CLI.

use std::time::Duration;

/// Bound on the initial navigation
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Network is considered idle after this long without in-flight requests
pub const NETWORK_IDLE_QUIET: Duration = Duration::from_secs(2);

/// Bound on the post-navigation network-idle wait
pub const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Pause after scrolling so lazy content can start loading
pub const POST_SCROLL_SETTLE: Duration = Duration::from_secs(3);

/// Bound on the post-scroll network-idle wait
pub const POST_SCROLL_IDLE_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to wait for the browser to flush trace data after Tracing.end
pub const TRACE_FLUSH_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for source map downloads
pub const SOURCE_MAP_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Trace event emitted for every style recalculation / layout tree update
pub const STYLE_RECALC_EVENT: &str = "UpdateLayoutTree";

// Screenshots in the trace are disabled; shifted nodes are captured separately
pub const TRACE_CATEGORIES: &[&str] = &[
    "-*",
    "devtools.timeline",
    "v8.execute",
    "disabled-by-default-devtools.timeline",
    "disabled-by-default-devtools.timeline.frame",
    "disabled-by-default-devtools.timeline.stack",
    "disabled-by-default-v8.cpu_profiler",
    "toplevel",
    "blink.console",
    "blink.user_timing",
    "latencyInfo",
];

/// Artifact names inside a results directory
pub const RESULTS_DIR_PREFIX: &str = "measurements-";
pub const RAW_PROFILE_FILE: &str = "profile.json";
pub const MAPPED_PROFILE_FILE: &str = "profile.mapped.json";
pub const REPORT_FILE: &str = "report.json";
pub const SCREENSHOTS_DIR: &str = "screenshots";

/// Attribute used to re-locate shifted DOM nodes from outside the page
pub const SHIFT_MARKER_ATTRIBUTE: &str = "data-cls-shift-id";

/// Columns are only printed when they are large enough to matter (minified bundles)
pub const COLUMN_DISPLAY_THRESHOLD: u32 = 120;

pub const DEFAULT_CPU_THROTTLING: f64 = 4.0;
pub const DEFAULT_DEVICE: &str = "Moto G4";

/// Default number of rows printed per attribution ranking
pub const DEFAULT_ATTRIBUTION_ROWS: usize = 30;
