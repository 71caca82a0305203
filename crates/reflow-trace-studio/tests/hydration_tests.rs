use pretty_assertions::assert_eq;
use reflow_trace_studio::hydration::{
    analyze_hydration, attribute, build_call_tree, find_hydration_event, hydration_interval,
    load_analysis_config, reflow_windows, walk_call_tree, wraps_hydration, AnalysisConfig,
    CallFrame, FrameClass, FrameClassifier, HeuristicClassifier, HydrationError, TimeWindow,
    VisitAction,
};
use reflow_trace_studio::parser::{parse_events, TraceEvent};
use serde_json::{json, Value};
use std::io::Write;

fn node(id: u64, parent: Option<u64>, function: &str, url: &str) -> Value {
    let mut node = json!({
        "id": id,
        "callFrame": {"functionName": function, "url": url, "scriptId": "1", "lineNumber": 0, "columnNumber": 0}
    });
    if let Some(parent) = parent {
        node["parent"] = json!(parent);
    }
    node
}

fn stackless_reflow(ts: f64, dur: f64) -> Value {
    json!({"name": "UpdateLayoutTree", "ph": "X", "ts": ts, "dur": dur, "pid": 1, "tid": 1, "args": {"beginData": {}}})
}

/// Hydration inside `[1000, 1700]`, bracketed by two stackless reflows
///
/// Samples (100µs each): hydrateRoot, App, Header (in App), format, App, idle.
fn hydration_trace() -> Value {
    json!({"traceEvents": [
        {"name": "Profile", "ph": "P", "ts": 950.0, "pid": 1, "tid": 1, "id": "0x1",
         "args": {"data": {"startTime": 1000.0}}},
        stackless_reflow(900.0, 100.0),
        {"name": "UpdateLayoutTree", "ph": "X", "ts": 1050.0, "dur": 10.0, "pid": 1, "tid": 1,
         "args": {"beginData": {"stackTrace": [
             {"url": "https://app.test/src/App.jsx", "lineNumber": 3, "columnNumber": 1, "functionName": "App"}
         ]}}},
        {"name": "ProfileChunk", "ph": "P", "ts": 1150.0, "pid": 1, "tid": 1, "id": "0x1",
         "args": {"data": {
             "cpuProfile": {
                 "nodes": [
                     node(1, None, "(root)", ""),
                     node(2, Some(1), "hydrateRoot", "https://app.test/node_modules/react-dom/client.js"),
                     node(3, Some(2), "App", "https://app.test/src/App.jsx"),
                     node(4, Some(3), "Header", "https://app.test/src/Header.jsx"),
                     node(5, Some(2), "format", "https://app.test/node_modules/@scope/pkg/index.js"),
                     node(6, Some(2), "ResizeObserver", "https://app.test/src/observe.js"),
                 ],
                 "samples": [2, 3, 4, 5, 3, 1]
             },
             "timeDeltas": [100, 100, 100, 100, 100, 100]
         }}},
        stackless_reflow(1700.0, 50.0),
    ]})
}

fn events() -> Vec<TraceEvent> {
    parse_events(&hydration_trace()).unwrap()
}

fn classifier() -> HeuristicClassifier {
    HeuristicClassifier::from_config(&AnalysisConfig::default()).unwrap()
}

fn frame(function: &str, url: &str) -> CallFrame {
    CallFrame {
        function_name: function.to_string(),
        url: url.to_string(),
        ..CallFrame::default()
    }
}

#[test]
fn test_hydration_event_is_found_by_suffix() {
    let events = events();
    let markers = vec!["hydrate".to_string(), "hydrateRoot".to_string()];

    assert_eq!(find_hydration_event(&events, &markers), Some(3));
    assert_eq!(find_hydration_event(&events, &["render".to_string()]), None);
}

#[test]
fn test_only_stackless_reflows_bound_hydration() {
    let events = events();

    let windows = reflow_windows(&events, wraps_hydration);

    assert_eq!(
        windows,
        vec![TimeWindow::new(900.0, 1000.0), TimeWindow::new(1700.0, 1750.0)]
    );
}

#[test]
fn test_window_is_end_of_before_to_start_of_after() {
    let analysis = analyze_hydration(&events(), &AnalysisConfig::default()).unwrap();

    assert_eq!(analysis.marker_index, 3);
    assert_eq!(analysis.marker_timestamp, 1150.0);
    assert_eq!(analysis.window, TimeWindow::new(1000.0, 1700.0));
}

#[test]
fn test_interval_needs_a_window_before() {
    let windows = vec![TimeWindow::new(2000.0, 2100.0)];

    let result = hydration_interval(&windows, 1500.0);

    assert!(matches!(result, Err(HydrationError::NoWindowBefore(ts)) if ts == 1500.0));
}

#[test]
fn test_reflow_spanning_the_marker_is_not_the_bracket_before() {
    let windows = vec![
        TimeWindow::new(100.0, 200.0),
        TimeWindow::new(1100.0, 1200.0),
        TimeWindow::new(1700.0, 1750.0),
    ];

    let window = hydration_interval(&windows, 1150.0).unwrap();

    assert_eq!(window, TimeWindow::new(200.0, 1100.0));
}

#[test]
fn test_interval_needs_a_window_after() {
    let windows = vec![TimeWindow::new(100.0, 200.0)];

    assert!(matches!(
        hydration_interval(&windows, 1500.0),
        Err(HydrationError::NoWindowAfter(_))
    ));
}

#[test]
fn test_missing_marker_is_an_error() {
    let config = AnalysisConfig {
        hydration_markers: vec!["mountApp".to_string()],
        ..AnalysisConfig::default()
    };

    let result = analyze_hydration(&events(), &config);

    assert!(matches!(result, Err(HydrationError::MarkerNotFound(_))));
}

#[test]
fn test_call_tree_times_are_clipped_to_window() {
    let root = build_call_tree(&events(), 1000.0, 1700.0);

    assert_eq!(root.total_time, 500.0);
    assert_eq!(root.children().len(), 1);

    let hydrate = &root.children()[0];
    assert_eq!(hydrate.frame.function_name, "hydrateRoot");
    assert_eq!(hydrate.self_time, 100.0);
    assert_eq!(hydrate.total_time, 500.0);

    // ResizeObserver was never sampled and is pruned
    let names: Vec<&str> = hydrate
        .children()
        .iter()
        .map(|c| c.frame.function_name.as_str())
        .collect();
    assert_eq!(names, vec!["App", "format"]);
    assert_eq!(hydrate.children()[0].total_time, 300.0);
}

#[test]
fn test_node_listed_in_two_chunks_appears_once() {
    let trace = json!([
        {"name": "Profile", "ph": "P", "ts": 0.0, "pid": 1, "tid": 1, "id": "0x2",
         "args": {"data": {"startTime": 0.0}}},
        {"name": "ProfileChunk", "ph": "P", "ts": 100.0, "pid": 1, "tid": 1, "id": "0x2",
         "args": {"data": {
             "cpuProfile": {
                 "nodes": [node(1, None, "(root)", ""), node(2, Some(1), "App", "https://app.test/src/App.jsx")],
                 "samples": [2]
             },
             "timeDeltas": [100]
         }}},
        {"name": "ProfileChunk", "ph": "P", "ts": 200.0, "pid": 1, "tid": 1, "id": "0x2",
         "args": {"data": {
             "cpuProfile": {
                 "nodes": [node(2, Some(1), "App", "https://app.test/src/App.jsx")],
                 "samples": [2, 1]
             },
             "timeDeltas": [100, 100]
         }}},
    ]);
    let events = parse_events(&trace).unwrap();

    let tree = build_call_tree(&events, 0.0, 1000.0);

    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].frame.function_name, "App");
    assert_eq!(tree.children[0].total_time, 200.0);
}

#[test]
fn test_narrow_window_only_counts_overlap() {
    let root = build_call_tree(&events(), 1150.0, 1250.0);

    // Half of the hydrateRoot sample and half of the first App sample
    assert_eq!(root.total_time, 100.0);
}

#[test]
fn test_attribution_stops_at_outermost_component() {
    let analysis = analyze_hydration(&events(), &AnalysisConfig::default()).unwrap();
    let attribution = analysis.attribute(&classifier());

    let components: Vec<(&str, f64)> = attribution
        .components
        .entries
        .iter()
        .map(|e| (e.name.as_str(), e.duration))
        .collect();
    assert_eq!(components, vec![("App", 300.0)]);
    assert_eq!(attribution.components.entries[0].nodes.len(), 1);

    let modules: Vec<(&str, f64)> = attribution
        .modules
        .entries
        .iter()
        .map(|e| (e.name.as_str(), e.duration))
        .collect();
    assert_eq!(modules, vec![("@scope/pkg", 100.0)]);
}

#[test]
fn test_rankings_are_sorted_with_shares() {
    let root = build_call_tree(&events(), 1000.0, 1700.0);
    let hydrate_only = &root.children()[0];
    let attribution = attribute(hydrate_only, &classifier());

    assert_eq!(attribution.components.total, 300.0);
    let app = &attribution.components.entries[0];
    assert_eq!(attribution.components.share(app), 100.0);
}

#[test]
fn test_classifier_rules() {
    let c = classifier();

    assert_eq!(
        c.classify(&frame("ProductCard", "https://app.test/src/card.js")),
        FrameClass::Component("ProductCard".to_string())
    );
    assert_eq!(
        c.classify(&frame("ProductCard", "https://app.test/node_modules/ui-kit/card.js")),
        FrameClass::Module("ui-kit".to_string())
    );
    assert_eq!(
        c.classify(&frame("ResizeObserver", "https://app.test/src/polyfill.js")),
        FrameClass::Unclassified
    );
    assert_eq!(
        c.classify(&frame("renderRoot", "https://app.test/node_modules/react-dom/index.js")),
        FrameClass::ExcludedModule("react-dom".to_string())
    );
    assert_eq!(
        c.classify(&frame("helper", "https://app.test/src/util.js")),
        FrameClass::Unclassified
    );
    assert_eq!(c.classify(&frame("", "")), FrameClass::Unclassified);
}

#[test]
fn test_nested_node_modules_use_innermost_package() {
    let c = classifier();

    assert_eq!(
        c.module_name("/node_modules/a/node_modules/@org/b/lib/x.js"),
        Some("@org/b".to_string())
    );
}

#[test]
fn test_excluded_modules_are_walked_through() {
    let root = build_call_tree(&events(), 1000.0, 1700.0);
    let mut visited = Vec::new();

    walk_call_tree(&root, &mut |node| {
        visited.push(node.frame.function_name.clone());
        match classifier().classify(&node.frame) {
            FrameClass::Component(_) | FrameClass::Module(_) => VisitAction::SkipChildren,
            _ => VisitAction::Continue,
        }
    });

    assert_eq!(visited, vec!["(root)", "hydrateRoot", "App", "format"]);
}

#[test]
fn test_walk_can_stop_early() {
    let root = build_call_tree(&events(), 1000.0, 1700.0);
    let mut visited = 0;

    let finished = walk_call_tree(&root, &mut |_| {
        visited += 1;
        if visited == 2 {
            VisitAction::Stop
        } else {
            VisitAction::Continue
        }
    });

    assert!(!finished);
    assert_eq!(visited, 2);
}

#[test]
fn test_custom_classifier_is_pluggable() {
    struct Everything;
    impl FrameClassifier for Everything {
        fn classify(&self, frame: &CallFrame) -> FrameClass {
            FrameClass::Component(frame.function_name.clone())
        }
    }

    let root = build_call_tree(&events(), 1000.0, 1700.0);
    let attribution = attribute(&root, &Everything);

    // The synthetic root swallows everything
    assert_eq!(attribution.components.len(), 1);
    assert_eq!(attribution.components.entries[0].name, "(root)");
    assert_eq!(attribution.components.total, 500.0);
}

#[test]
fn test_load_analysis_config_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "excluded_modules = [\"react-dom\", \"lodash\"]").unwrap();

    let config = load_analysis_config(file.path()).unwrap();

    assert_eq!(config.excluded_modules, vec!["react-dom", "lodash"]);
    assert_eq!(config.hydration_markers, AnalysisConfig::default().hydration_markers);
}

#[test]
fn test_invalid_pattern_is_reported() {
    let config = AnalysisConfig {
        component_pattern: "(".to_string(),
        ..AnalysisConfig::default()
    };

    assert!(matches!(
        HeuristicClassifier::from_config(&config),
        Err(HydrationError::InvalidPattern(_))
    ));
}
