//! Measurement command implementation.
//!
//! The measure command:
//! 1. Creates the timestamped results directory
//! 2. Launches the browser and applies emulation
//! 3. Captures a trace while tracking layout shifts
//! 4. Source-maps the trace
//! 5. Aggregates reflows and prints the report

use crate::aggregator::aggregate_reflows;
use crate::browser::{
    device_names, find_device, BrowserDriver, ChromeSession, DeviceProfile, LaunchConfig,
};
use crate::commands::models::MeasureArgs;
use crate::output::{create_results_dir, render_measurement, write_report, ResultsDir};
use crate::parser::schema::{LayoutShiftRecord, MeasurementReport};
use crate::parser::source_map::{load_mapped_profile, SourceMapper};
use crate::tracking::{extract_tracking_result, LayoutShiftTracker};
use crate::utils::config::{
    NAVIGATION_TIMEOUT, NETWORK_IDLE_QUIET, NETWORK_IDLE_TIMEOUT, POST_SCROLL_IDLE_TIMEOUT,
    POST_SCROLL_SETTLE,
};
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use log::{debug, info, warn};
use std::fs;
use std::thread;
use std::time::Instant;

/// Execute a full measurement run
///
/// **Public** - main entry point called from the `reflow-trace` binary
///
/// # Errors
/// * Unknown device
/// * Results directory cannot be created
/// * Browser launch or protocol failures
/// * Source map or trace parsing failures
///
/// # Example
/// ```ignore
/// let args = MeasureArgs {
///     url: "https://example.com".to_string(),
///     ..MeasureArgs::default()
/// };
/// execute_measure(args)?;
/// ```
pub fn execute_measure(args: MeasureArgs) -> Result<()> {
    let start_time = Instant::now();
    let device = find_device(&args.device)?;

    let results = create_results_dir(&args.output_root, &Local::now())
        .context("Failed to create results directory")?;
    info!("Writing results to {}", results.root.display());

    let session = ChromeSession::launch(&LaunchConfig {
        show_browser: args.show_browser,
        window_size: (device.width, device.height),
    })
    .context("Failed to launch browser")?;
    session
        .emulate(device, args.cpu_throttling)
        .context("Failed to apply device emulation")?;

    let shifts = capture_trace(&session, &args, &results)?;
    drop(session);
    debug!("Browser closed");

    info!("Source-mapping trace...");
    let mut mapper = SourceMapper::new().context("Failed to create source map client")?;
    let mapped = load_mapped_profile(&results.raw_profile(), &results.mapped_profile(), &mut mapper)
        .context("Failed to source-map trace")?;

    let reflows = aggregate_reflows(&mapped).context("Failed to aggregate reflows")?;

    println!("{}", render_measurement(&reflows, &shifts, args.top_reflows));

    if args.json_report {
        let report = MeasurementReport {
            url: args.url.clone(),
            device: device.name.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            reflows,
            layout_shifts: shifts,
        };
        write_report(&report, results.report()).context("Failed to write report")?;
    }

    info!(
        "Measurement completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Drive one traced page load and collect layout shifts
///
/// **Public** - generic over the driver so the sequence can run against a fake
///
/// Waits that time out are logged and the run continues. The raw trace ends
/// up at [`ResultsDir::raw_profile`].
pub fn capture_trace<D: BrowserDriver>(
    driver: &D,
    args: &MeasureArgs,
    results: &ResultsDir,
) -> Result<Vec<LayoutShiftRecord>> {
    let tracker =
        LayoutShiftTracker::install(driver).context("Failed to install layout shift tracker")?;

    let trace_file = tempfile::NamedTempFile::new().context("Failed to create trace file")?;
    driver.start_trace().context("Failed to start tracing")?;

    info!("Navigating to {}", args.url);
    if !driver
        .navigate(&args.url, NAVIGATION_TIMEOUT)
        .context("Navigation failed")?
    {
        warn!(
            "Navigation timeout: page did not finish loading within {}s, continuing",
            NAVIGATION_TIMEOUT.as_secs()
        );
    }

    if !driver.wait_for_network_idle(NETWORK_IDLE_QUIET, NETWORK_IDLE_TIMEOUT) {
        warn!(
            "Network idle timeout: requests still in flight after {}s, continuing",
            NETWORK_IDLE_TIMEOUT.as_secs()
        );
    }

    if args.scroll_down {
        info!("Scrolling to the bottom of the page");
        driver
            .scroll_to_bottom()
            .context("Failed to scroll page")?;
        thread::sleep(POST_SCROLL_SETTLE);
        if !driver.wait_for_network_idle(NETWORK_IDLE_QUIET, POST_SCROLL_IDLE_TIMEOUT) {
            warn!("Network idle timeout after scrolling, continuing");
        }
    }

    driver
        .stop_trace(trace_file.path())
        .context("Failed to stop tracing")?;

    let shifts = extract_tracking_result(tracker, driver, &results.screenshots)
        .context("Failed to extract layout shifts")?;

    fs::copy(trace_file.path(), results.raw_profile())
        .context("Failed to write raw trace")?;
    debug!("Raw trace written to {}", results.raw_profile().display());

    Ok(shifts)
}

/// Resolve `--device` against the known-device table
///
/// The error message lists every valid device.
pub fn validate_device(name: &str) -> Result<&'static DeviceProfile> {
    find_device(name).map_err(|e| anyhow::anyhow!("{}. {}", e, device_list_message()))
}

/// Usage hint listing every valid device
pub fn device_list_message() -> String {
    format!("Valid devices are: {}", device_names().join(", "))
}

/// Validate measure arguments
///
/// **Public** - can be called before execute_measure for early validation
pub fn validate_args(args: &MeasureArgs) -> Result<()> {
    if args.url.is_empty() {
        anyhow::bail!("URL cannot be empty");
    }

    if !args.url.starts_with("http://")
        && !args.url.starts_with("https://")
        && !args.url.starts_with("file://")
    {
        anyhow::bail!("URL must start with http://, https:// or file://");
    }

    if !args.cpu_throttling.is_finite() || args.cpu_throttling < 1.0 {
        anyhow::bail!("CPU throttling rate must be at least 1");
    }

    if args.top_reflows == Some(0) {
        anyhow::bail!("top must be greater than 0");
    }

    validate_device(&args.device)?;

    Ok(())
}
