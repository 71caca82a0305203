//! Hydration analysis command implementation.

use crate::commands::models::HydrationArgs;
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::hydration::{
    analyze_hydration, load_analysis_config, AnalysisConfig, HeuristicClassifier,
};
use crate::output::{render_attribution, write_svg};
use crate::parser::{parse_events, read_trace_file};
use anyhow::{Context, Result};
use log::info;

/// Execute the offline hydration analysis
///
/// **Public** - main entry point called from the `reflow-hydration` binary
///
/// # Errors
/// * Trace or config cannot be read
/// * No hydration marker, or hydration not bracketed by reflows
///   (the underlying `HydrationError` is kept in the chain)
///
/// # Example
/// ```ignore
/// execute_hydration(HydrationArgs {
///     trace: PathBuf::from("measurements-2024-03-05-14-07-09-042/profile.mapped.json"),
///     ..HydrationArgs::default()
/// })?;
/// ```
pub fn execute_hydration(args: HydrationArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_analysis_config(path)
            .with_context(|| format!("Failed to load analysis config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    let classifier = HeuristicClassifier::from_config(&config)?;

    let raw = read_trace_file(&args.trace)
        .with_context(|| format!("Failed to read trace {}", args.trace.display()))?;
    let events = parse_events(&raw)?;
    info!("Loaded {} trace events", events.len());

    let analysis = analyze_hydration(&events, &config)?;
    let attribution = analysis.attribute(&classifier);

    println!(
        "\nHydration window: {:.2} ms",
        analysis.window.duration() / 1000.0
    );
    println!("{}", render_attribution(&attribution, args.top));

    if let Some(path) = &args.flamegraph {
        let flamegraph_config = FlamegraphConfig::new().with_title(format!(
            "Hydration ({:.2} ms)",
            analysis.window.duration() / 1000.0
        ));
        let svg = generate_flamegraph(&analysis.call_tree, &classifier, Some(&flamegraph_config))
            .context("Failed to generate flamegraph")?;
        write_svg(&svg, path).context("Failed to write flamegraph SVG")?;
    }

    Ok(())
}
