use reflow_trace_studio::flamegraph::{generate_flamegraph, FlamegraphConfig, NodeCategory};
use reflow_trace_studio::hydration::{
    build_call_tree, AnalysisConfig, FrameClass, HeuristicClassifier,
};
use reflow_trace_studio::parser::parse_events;
use reflow_trace_studio::utils::error::FlamegraphError;
use serde_json::json;

fn classifier() -> HeuristicClassifier {
    HeuristicClassifier::from_config(&AnalysisConfig::default()).unwrap()
}

#[test]
fn test_node_category() {
    assert_eq!(
        NodeCategory::from_class(&FrameClass::Component("App".to_string())),
        NodeCategory::Component
    );
    assert_eq!(
        NodeCategory::from_class(&FrameClass::ExcludedModule("react".to_string())),
        NodeCategory::Framework
    );
    assert_eq!(
        NodeCategory::from_class(&FrameClass::Unclassified),
        NodeCategory::Other
    );
}

#[test]
fn test_empty_tree_is_rejected() {
    let root = build_call_tree(&[], 0.0, 100.0);

    let result = generate_flamegraph(&root, &classifier(), None);

    assert!(matches!(result, Err(FlamegraphError::EmptyTree)));
}

#[test]
fn test_flamegraph_has_title_and_frames() {
    let events = parse_events(&json!([
        {"name": "ProfileChunk", "ts": 0.0, "pid": 1, "id": "0x1", "args": {"data": {
            "cpuProfile": {
                "nodes": [
                    {"id": 1, "callFrame": {"functionName": "(root)"}},
                    {"id": 2, "parent": 1, "callFrame": {"functionName": "Navigation", "url": "https://app.test/src/Nav.jsx"}},
                    {"id": 3, "parent": 1, "callFrame": {"functionName": "debounce", "url": "https://app.test/node_modules/lodash/debounce.js"}}
                ],
                "samples": [2, 3, 1]
            },
            "timeDeltas": [100, 100, 100]
        }}}
    ]))
    .unwrap();
    let root = build_call_tree(&events, 0.0, 1000.0);
    let config = FlamegraphConfig::new().with_title("Hydration <test>").with_width(800);

    let svg = generate_flamegraph(&root, &classifier(), Some(&config)).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains("width=\"800\""));
    assert!(svg.contains("Hydration &lt;test&gt;"));
    assert!(svg.contains("Navigation"));
    assert!(svg.contains("debounce"));
    assert!(svg.contains("Navigation: 0.10 ms total"));
}
