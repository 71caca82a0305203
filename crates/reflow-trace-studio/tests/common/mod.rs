//! In-memory fakes for the browser seams.

#![allow(dead_code)]

use reflow_trace_studio::browser::{
    marker_ids, BrowserDriver, DeviceProfile, NodeHandle, PageSession,
};
use reflow_trace_studio::utils::error::BrowserError;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;

pub struct FakeNode {
    pub marker: String,
    pub attached: bool,
}

impl NodeHandle for FakeNode {
    fn marker(&self) -> &str {
        &self.marker
    }

    fn try_screenshot(&self) -> Option<Vec<u8>> {
        self.attached.then(|| b"\x89PNG fake".to_vec())
    }
}

/// Page that answers tracker expressions from a canned buffer
#[derive(Default)]
pub struct FakePage {
    /// What `collect()` returns; `Null` means the tracker is missing
    pub buffer: Value,
    /// Markers whose nodes are detached by extraction time
    pub detached: Vec<String>,
    pub scripts: RefCell<Vec<String>>,
    pub tagged: RefCell<Vec<String>>,
    /// Marker attribute per distinct node (keyed by xPath), as the page holds it
    pub marker_attributes: RefCell<Vec<(String, String)>>,
    pub teardowns: RefCell<usize>,
    pub calls: RefCell<Vec<String>>,
}

impl FakePage {
    pub fn with_buffer(buffer: Value) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }

    pub fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }

    fn source_x_path(&self, triple: &Value) -> Option<String> {
        let entry = triple.get(0)?.as_u64()? as usize;
        let source = triple.get(1)?.as_u64()? as usize;
        self.buffer
            .get(entry)?
            .get("sources")?
            .get(source)?
            .get("xPath")?
            .as_str()
            .map(str::to_string)
    }

    /// Append `id` to the node's marker list, like the page script does
    fn mark(&self, node: String, id: &str) {
        let mut attributes = self.marker_attributes.borrow_mut();
        match attributes.iter_mut().find(|(key, _)| *key == node) {
            Some((_, value)) => {
                value.push(' ');
                value.push_str(id);
            }
            None => attributes.push((node, id.to_string())),
        }
    }
}

impl PageSession for FakePage {
    fn install_script(&self, source: &str) -> Result<(), BrowserError> {
        self.record("install_script");
        self.scripts.borrow_mut().push(source.to_string());
        Ok(())
    }

    fn evaluate(&self, expression: &str, _await_promise: bool) -> Result<Value, BrowserError> {
        if expression.contains(".collect()") {
            self.record("collect");
            return Ok(self.buffer.clone());
        }
        if expression.contains(".teardown()") {
            self.record("teardown");
            *self.teardowns.borrow_mut() += 1;
            return Ok(Value::Null);
        }
        if let Some(start) = expression.find(".tag(") {
            self.record("tag");
            let args = &expression[start + 5..expression.len() - 1];
            let triples_start = args.find('[').unwrap_or(args.len());
            let triples: Value = serde_json::from_str(&args[triples_start..]).unwrap_or(json!([]));
            for triple in triples.as_array().into_iter().flatten() {
                if let Some(id) = triple.get(2).and_then(Value::as_str) {
                    self.tagged.borrow_mut().push(id.to_string());
                    let node = self.source_x_path(triple).unwrap_or_else(|| id.to_string());
                    self.mark(node, id);
                }
            }
            return Ok(Value::Null);
        }
        Ok(Value::Null)
    }

    fn query_marked_nodes(&self, _attribute: &str) -> Result<Vec<Box<dyn NodeHandle>>, BrowserError> {
        self.record("query_marked_nodes");
        Ok(self
            .marker_attributes
            .borrow()
            .iter()
            .flat_map(|(_, value)| marker_ids(value).map(str::to_string).collect::<Vec<_>>())
            .map(|marker| {
                let attached = !self.detached.contains(&marker);
                Box::new(FakeNode { marker, attached }) as Box<dyn NodeHandle>
            })
            .collect())
    }
}

/// Driver that records the order of calls and writes an empty trace
#[derive(Default)]
pub struct FakeDriver {
    pub page: FakePage,
    pub navigation_completes: bool,
    pub network_goes_idle: bool,
}

impl PageSession for FakeDriver {
    fn install_script(&self, source: &str) -> Result<(), BrowserError> {
        self.page.install_script(source)
    }

    fn evaluate(&self, expression: &str, await_promise: bool) -> Result<Value, BrowserError> {
        self.page.evaluate(expression, await_promise)
    }

    fn query_marked_nodes(&self, attribute: &str) -> Result<Vec<Box<dyn NodeHandle>>, BrowserError> {
        self.page.query_marked_nodes(attribute)
    }
}

impl BrowserDriver for FakeDriver {
    fn emulate(&self, _device: &DeviceProfile, _cpu_throttling: f64) -> Result<(), BrowserError> {
        self.page.record("emulate");
        Ok(())
    }

    fn start_trace(&self) -> Result<(), BrowserError> {
        self.page.record("start_trace");
        Ok(())
    }

    fn stop_trace(&self, path: &Path) -> Result<(), BrowserError> {
        self.page.record("stop_trace");
        std::fs::write(path, r#"{"traceEvents":[]}"#)?;
        Ok(())
    }

    fn navigate(&self, _url: &str, _timeout: Duration) -> Result<bool, BrowserError> {
        self.page.record("navigate");
        Ok(self.navigation_completes)
    }

    fn wait_for_network_idle(&self, _quiet: Duration, _timeout: Duration) -> bool {
        self.page.record("wait_for_network_idle");
        self.network_goes_idle
    }

    fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.page.record("scroll_to_bottom");
        Ok(())
    }
}

/// A buffered layout-shift entry as the page serializes it
pub fn shift_entry(value: f64, had_recent_input: bool, sources: Value) -> Value {
    json!({
        "value": value,
        "hadRecentInput": had_recent_input,
        "sources": sources,
    })
}

pub fn shift_source(name: &str, previous: (f64, f64), current: (f64, f64)) -> Value {
    json!({
        "nodeName": name,
        "xPath": format!("//*[@id=\"main\"]/{}[1]", name),
        "previousRect": {"x": previous.0, "y": previous.1, "width": 100.0, "height": 20.0},
        "currentRect": {"x": current.0, "y": current.1, "width": 100.0, "height": 20.0},
    })
}
