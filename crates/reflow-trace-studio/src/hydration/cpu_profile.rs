//! Top-down CPU call trees from sampled profiles embedded in a trace.
//!
//! V8 reports its sampling profiler through a `Profile` event (start time)
//! followed by `ProfileChunk` events carrying new nodes, sampled node ids and
//! the time deltas between samples. Each sample lasts until the next one.

use crate::parser::trace::TraceEvent;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Function location as reported by the CPU profiler (zero-based line/column)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
}

impl CallFrame {
    /// Frames with neither a name nor a script cannot be classified
    pub fn is_identifiable(&self) -> bool {
        !self.function_name.is_empty() || !self.url.is_empty()
    }
}

/// One node of a top-down call tree; times are in microseconds
#[derive(Debug, Clone, PartialEq)]
pub struct CallTreeNode {
    pub frame: CallFrame,
    /// Time of this node and everything beneath it
    pub total_time: f64,
    pub self_time: f64,
    pub children: Vec<CallTreeNode>,
}

impl CallTreeNode {
    fn root() -> Self {
        Self {
            frame: CallFrame {
                function_name: "(root)".to_string(),
                ..CallFrame::default()
            },
            total_time: 0.0,
            self_time: 0.0,
            children: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn children(&self) -> &[CallTreeNode] {
        &self.children
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CallTreeNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfileNode {
    id: u64,
    #[serde(default)]
    call_frame: CallFrame,
    #[serde(default)]
    parent: Option<u64>,
    #[serde(default)]
    children: Vec<u64>,
}

#[derive(Debug, Clone)]
struct ProfileNode {
    frame: CallFrame,
    parent: Option<u64>,
}

/// One sampled CPU profile reassembled from its trace events
#[derive(Debug, Clone, Default)]
pub struct CpuProfile {
    nodes: HashMap<u64, ProfileNode>,
    /// Node ids in first-seen order, so sibling order follows the profiler
    order: Vec<u64>,
    seen: HashSet<u64>,
    /// `(node id, timestamp µs)` pairs
    samples: Vec<(u64, f64)>,
    last_timestamp: f64,
}

impl CpuProfile {
    fn new(start_time: f64) -> Self {
        Self {
            last_timestamp: start_time,
            ..Self::default()
        }
    }

    fn add_chunk(&mut self, data: &Value) {
        if let Some(nodes) = data.pointer("/cpuProfile/nodes").and_then(Value::as_array) {
            for raw in nodes {
                let Ok(node) = RawProfileNode::deserialize(raw) else {
                    continue;
                };
                self.add_node(node);
            }
        }

        let samples = data
            .pointer("/cpuProfile/samples")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let deltas = data
            .get("timeDeltas")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for (sample, delta) in samples.iter().zip(deltas) {
            self.last_timestamp += delta.as_f64().unwrap_or(0.0);
            if let Some(id) = sample.as_u64() {
                self.samples.push((id, self.last_timestamp));
            }
        }
    }

    fn add_node(&mut self, node: RawProfileNode) {
        // `.cpuprofile`-style nodes list children instead of a parent
        for child in &node.children {
            if let Some(existing) = self.nodes.get_mut(child) {
                existing.parent = Some(node.id);
            } else {
                self.nodes.insert(
                    *child,
                    ProfileNode {
                        frame: CallFrame::default(),
                        parent: Some(node.id),
                    },
                );
            }
        }

        let parent = node
            .parent
            .or_else(|| self.nodes.get(&node.id).and_then(|n| n.parent));
        if self.seen.insert(node.id) {
            self.order.push(node.id);
        }
        self.nodes.insert(
            node.id,
            ProfileNode {
                frame: node.call_frame,
                parent,
            },
        );
    }

    /// Self time per node id within `[start, end]`
    ///
    /// Each sample covers the span until the next one and is clipped to the window.
    fn self_times(&self, start: f64, end: f64) -> HashMap<u64, f64> {
        let mut samples = self.samples.clone();
        samples.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut times = HashMap::new();
        for (i, &(id, ts)) in samples.iter().enumerate() {
            let next = samples.get(i + 1).map_or(ts, |&(_, next_ts)| next_ts);
            let overlap = next.min(end) - ts.max(start);
            if overlap > 0.0 {
                *times.entry(id).or_insert(0.0) += overlap;
            }
        }
        times
    }

    /// Top-down tree for `[start, end]`; roots are returned as a list
    fn top_down(&self, start: f64, end: f64) -> Vec<CallTreeNode> {
        let self_times = self.self_times(start, end);

        let mut children_of: HashMap<u64, Vec<u64>> = HashMap::new();
        let mut roots = Vec::new();
        for id in &self.order {
            match self.nodes.get(id).and_then(|n| n.parent) {
                Some(parent) => children_of.entry(parent).or_default().push(*id),
                None => roots.push(*id),
            }
        }

        roots
            .into_iter()
            .filter_map(|id| self.build_node(id, &children_of, &self_times))
            .collect()
    }

    fn build_node(
        &self,
        id: u64,
        children_of: &HashMap<u64, Vec<u64>>,
        self_times: &HashMap<u64, f64>,
    ) -> Option<CallTreeNode> {
        let node = self.nodes.get(&id)?;
        let children: Vec<CallTreeNode> = children_of
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|child| self.build_node(*child, children_of, self_times))
                    .collect()
            })
            .unwrap_or_default();

        let self_time = self_times.get(&id).copied().unwrap_or(0.0);
        let total_time = self_time + children.iter().map(|c| c.total_time).sum::<f64>();
        if total_time <= 0.0 {
            return None;
        }

        Some(CallTreeNode {
            frame: node.frame.clone(),
            total_time,
            self_time,
            children,
        })
    }
}

/// Reassemble every CPU profile in a trace, keyed by `(pid, profile id)`
pub fn collect_profiles(events: &[TraceEvent]) -> Vec<CpuProfile> {
    let mut index_by_key: HashMap<(Option<i64>, Option<String>), usize> = HashMap::new();
    let mut profiles: Vec<CpuProfile> = Vec::new();

    for event in events {
        let key = (event.pid, event.id.clone());
        match event.name.as_str() {
            "Profile" => {
                let start = event
                    .args
                    .pointer("/data/startTime")
                    .and_then(Value::as_f64)
                    .unwrap_or(event.ts);
                index_by_key.insert(key, profiles.len());
                profiles.push(CpuProfile::new(start));
            }
            "ProfileChunk" => {
                let index = *index_by_key.entry(key).or_insert_with(|| {
                    profiles.push(CpuProfile::new(event.ts));
                    profiles.len() - 1
                });
                if let Some(data) = event.args.get("data") {
                    profiles[index].add_chunk(data);
                }
            }
            _ => {}
        }
    }

    debug!("Reassembled {} CPU profiles", profiles.len());
    profiles
}

/// Build a top-down call tree for `[start_us, end_us]` across all profiles
///
/// **Public** - the call-tree builder used by the hydration analyzer
///
/// The returned root is synthetic; each profile's own root nodes hang below it.
pub fn build_call_tree(events: &[TraceEvent], start_us: f64, end_us: f64) -> CallTreeNode {
    let mut root = CallTreeNode::root();

    for profile in collect_profiles(events) {
        for node in profile.top_down(start_us, end_us) {
            // Fold the profiler's own "(root)" into ours
            if node.frame.function_name == "(root)" && node.frame.url.is_empty() {
                root.self_time += node.self_time;
                root.children.extend(node.children);
            } else {
                root.children.push(node);
            }
        }
    }

    root.total_time = root.self_time + root.children.iter().map(|c| c.total_time).sum::<f64>();
    debug!(
        "Call tree for [{:.0}, {:.0}]: {} nodes, {:.2}ms",
        start_us,
        end_us,
        root.node_count(),
        root.total_time / 1000.0
    );
    root
}
