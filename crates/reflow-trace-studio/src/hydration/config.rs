//! Attribution settings, optionally loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::HydrationError;

/// Heuristics used by the hydration analyzer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A CPU profile node whose function name ends with one of these marks hydration
    pub hydration_markers: Vec<String>,

    /// Third-party modules that are framework overhead, never attributed
    pub excluded_modules: Vec<String>,

    /// Function names that look like components but are not
    pub excluded_components: Vec<String>,

    /// Function names treated as UI components
    pub component_pattern: String,

    /// Extracts a package name from a script URL; capture group 1 is the name
    pub module_pattern: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hydration_markers: vec!["hydrate".to_string(), "hydrateRoot".to_string()],
            excluded_modules: vec![
                "react".to_string(),
                "react-dom".to_string(),
                "scheduler".to_string(),
            ],
            excluded_components: vec!["ResizeObserver".to_string()],
            component_pattern: r"^(?:[A-Z][a-z0-9]+)+$".to_string(),
            module_pattern: r"node_modules/((?:@[^/]+/)?[^/]+)".to_string(),
        }
    }
}

/// Load analysis settings from a TOML file; missing keys keep their defaults
///
/// # Example
/// ```ignore
/// let config = load_analysis_config("analysis.toml")?;
/// ```
pub fn load_analysis_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, HydrationError> {
    let contents = fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&contents)?;
    Ok(config)
}
