//! Reflow Trace CLI
//!
//! Loads a page in a throttled, emulated browser and reports where layout
//! reflows and layout shifts come from.

use anyhow::Result;
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::error;
use std::path::PathBuf;
use std::process;

use reflow_trace_studio::commands::{execute_measure, validate_args, validate_device, MeasureArgs};
use reflow_trace_studio::utils::config::{DEFAULT_CPU_THROTTLING, DEFAULT_DEVICE};

/// Reflow Trace - layout reflow and layout shift profiling for web pages
#[derive(Parser, Debug)]
#[command(name = "reflow-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Page to measure
    url: Option<String>,

    /// Show the browser window instead of running headless
    #[arg(short = 'b', long = "showBrowser")]
    show_browser: bool,

    /// Scroll to the bottom after load to provoke below-the-fold layout shifts
    #[arg(long = "scrollDown", action = ArgAction::Set, default_value_t = true)]
    scroll_down: bool,

    /// CPU slowdown factor (1 = no throttling)
    #[arg(long = "cpuThrottling", default_value_t = DEFAULT_CPU_THROTTLING)]
    cpu_throttling: f64,

    /// Device to emulate
    #[arg(long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Print at most this many reflow locations
    #[arg(long)]
    top: Option<usize>,

    /// Also write report.json into the results directory
    #[arg(long)]
    json_report: bool,

    /// Directory the timestamped results directory is created in
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let Some(url) = cli.url else {
        println!("Please provide a URL to measure, e.g. reflow-trace https://example.com");
        return Ok(());
    };

    if let Err(e) = validate_device(&cli.device) {
        eprintln!("{}", e);
        process::exit(1);
    }

    let args = MeasureArgs {
        url,
        show_browser: cli.show_browser,
        scroll_down: cli.scroll_down,
        cpu_throttling: cli.cpu_throttling,
        device: cli.device,
        output_root: cli.output_dir,
        top_reflows: cli.top,
        json_report: cli.json_report,
    };

    if let Err(e) = validate_args(&args) {
        error!("Invalid arguments: {:#}", e);
        process::exit(1);
    }

    execute_measure(args)
}
