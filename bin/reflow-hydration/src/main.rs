//! Reflow Hydration CLI
//!
//! Offline attribution of hydration CPU time to UI components and
//! third-party modules, from a source-mapped trace.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::error;
use std::path::PathBuf;
use std::process;

use reflow_trace_studio::commands::{execute_hydration, HydrationArgs};
use reflow_trace_studio::utils::config::DEFAULT_ATTRIBUTION_ROWS;

/// Reflow Hydration - where hydration time goes
#[derive(Parser, Debug)]
#[command(name = "reflow-hydration")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source-mapped trace (profile.mapped.json)
    trace: PathBuf,

    /// Analysis settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a flamegraph SVG of the hydration window
    #[arg(short, long)]
    flamegraph: Option<PathBuf>,

    /// Rows printed per ranking
    #[arg(long, default_value_t = DEFAULT_ATTRIBUTION_ROWS)]
    top: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = HydrationArgs {
        trace: cli.trace,
        config: cli.config,
        flamegraph: cli.flamegraph,
        top: cli.top,
    };

    if let Err(e) = execute_hydration(args) {
        error!("Hydration analysis failed: {:#}", e);
        process::exit(1);
    }

    Ok(())
}
