use pretty_assertions::assert_eq;
use reflow_trace_studio::aggregator::{aggregate_reflows, total_reflow_time};
use serde_json::{json, Value};

fn reflow(url: &str, line: u32, column: u32, function: &str, dur: f64) -> Value {
    json!({
        "name": "UpdateLayoutTree",
        "cat": "blink,devtools.timeline",
        "ph": "X",
        "ts": 1000.0,
        "dur": dur,
        "pid": 1,
        "tid": 1,
        "args": {
            "beginData": {
                "frame": "F1",
                "stackTrace": [
                    {"url": url, "lineNumber": line, "columnNumber": column, "functionName": function},
                    {"url": "https://app.test/vendor.js", "lineNumber": 1, "columnNumber": 1, "functionName": "outer"}
                ]
            }
        }
    })
}

fn stackless_reflow(dur: f64) -> Value {
    json!({"name": "UpdateLayoutTree", "ph": "X", "ts": 10.0, "dur": dur, "args": {"beginData": {}}})
}

#[test]
fn test_same_location_is_summed() {
    let trace = json!([
        reflow("https://app.test/main.js", 10, 5, "measure", 100.0),
        reflow("https://app.test/main.js", 10, 5, "measure", 250.0),
        reflow("https://app.test/main.js", 10, 5, "measure", 50.0),
    ]);

    let entries = aggregate_reflows(&trace).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].count, 3);
    assert_eq!(entries[0].duration, 400.0);
    assert_eq!(entries[0].key(), "https://app.test/main.js:10:5");
    assert_eq!(format!("{:.2} ms", entries[0].duration_ms()), "0.40 ms");
}

#[test]
fn test_first_seen_function_name_is_kept() {
    let trace = json!([
        reflow("https://app.test/main.js", 3, 1, "first", 10.0),
        reflow("https://app.test/main.js", 3, 1, "renamed", 10.0),
    ]);

    let entries = aggregate_reflows(&trace).unwrap();

    assert_eq!(entries[0].function_name, "first");
}

#[test]
fn test_output_is_sorted_by_duration() {
    let trace = json!([
        reflow("https://app.test/a.js", 1, 1, "a", 10.0),
        reflow("https://app.test/b.js", 2, 1, "b", 300.0),
        reflow("https://app.test/c.js", 3, 1, "c", 50.0),
        reflow("https://app.test/a.js", 1, 1, "a", 60.0),
    ]);

    let entries = aggregate_reflows(&trace).unwrap();

    let durations: Vec<f64> = entries.iter().map(|e| e.duration).collect();
    assert_eq!(durations, vec![300.0, 70.0, 50.0]);
    assert!(entries.windows(2).all(|w| w[0].duration >= w[1].duration));
    assert_eq!(total_reflow_time(&entries), 420.0);
}

#[test]
fn test_both_trace_shapes_aggregate_identically() {
    let events = json!([
        reflow("https://app.test/a.js", 1, 1, "a", 10.0),
        reflow("https://app.test/b.js", 7, 200, "b", 30.0),
    ]);
    let wrapped = json!({ "traceEvents": events.clone(), "metadata": {} });

    assert_eq!(
        aggregate_reflows(&events).unwrap(),
        aggregate_reflows(&wrapped).unwrap()
    );
}

#[test]
fn test_events_without_stack_trace_are_ignored() {
    let trace = json!([
        stackless_reflow(500.0),
        {"name": "UpdateLayoutTree", "ph": "X", "ts": 20.0, "dur": 40.0, "args": {}},
        reflow("https://app.test/a.js", 1, 1, "a", 10.0),
    ]);

    let entries = aggregate_reflows(&trace).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration, 10.0);
}

#[test]
fn test_other_event_names_are_ignored() {
    let mut layout = reflow("https://app.test/a.js", 1, 1, "a", 10.0);
    layout["name"] = json!("Layout");

    let entries = aggregate_reflows(&json!([layout])).unwrap();

    assert!(entries.is_empty());
}

#[test]
fn test_invalid_trace_shape_is_rejected() {
    assert!(aggregate_reflows(&json!({"events": []})).is_err());
    assert!(aggregate_reflows(&json!("nope")).is_err());
}
