//! Hydration CPU-time attribution.
//!
//! Locates the hydration call in a mapped trace, bounds it by the surrounding
//! stackless reflows, builds a top-down call tree for that window and
//! attributes its time to UI components and third-party modules.
//!
//! # Example
//! ```ignore
//! use reflow_trace_studio::hydration::{analyze_hydration, AnalysisConfig, HeuristicClassifier};
//! use reflow_trace_studio::parser::{parse_events, read_trace_file};
//!
//! let events = parse_events(&read_trace_file("profile.mapped.json")?)?;
//! let config = AnalysisConfig::default();
//! let analysis = analyze_hydration(&events, &config)?;
//! let attribution = analysis.attribute(&HeuristicClassifier::from_config(&config)?);
//! ```

mod analyzer;
mod attribution;
mod config;
mod cpu_profile;
mod window;

// Public API exports
pub use analyzer::{analyze_hydration, HydrationAnalysis};
pub use attribution::{
    attribute, walk_call_tree, Attribution, AttributionEntry, FrameClass, FrameClassifier,
    HeuristicClassifier, Ranking, VisitAction,
};
pub use config::{load_analysis_config, AnalysisConfig};
pub use cpu_profile::{build_call_tree, collect_profiles, CallFrame, CallTreeNode, CpuProfile};
pub use window::{
    find_hydration_event, hydration_interval, reflow_windows, wraps_hydration, TimeWindow,
};

// Error type
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HydrationError {
    #[error("No CPU profile node ending with any of {0:?} was found in the trace")]
    MarkerNotFound(Vec<String>),

    #[error("No stackless reflow finished before hydration at {0}µs")]
    NoWindowBefore(f64),

    #[error("No stackless reflow follows the one before hydration at {0}µs")]
    NoWindowAfter(f64),

    #[error("Invalid attribution pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Analysis config TOML parse error: {0}")]
    ConfigParseFailed(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
