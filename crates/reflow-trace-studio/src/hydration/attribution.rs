//! Attributing call-tree time to UI components and third-party modules.

use super::config::AnalysisConfig;
use super::cpu_profile::{CallFrame, CallTreeNode};
use super::HydrationError;
use regex::Regex;
use std::collections::HashMap;

/// What a visitor wants the walk to do after seeing a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
    Continue,
    SkipChildren,
    Stop,
}

/// Depth-first, pre-order walk; returns `false` if the visitor stopped it
pub fn walk_call_tree<'a, F>(node: &'a CallTreeNode, visit: &mut F) -> bool
where
    F: FnMut(&'a CallTreeNode) -> VisitAction,
{
    match visit(node) {
        VisitAction::Stop => false,
        VisitAction::SkipChildren => true,
        VisitAction::Continue => node
            .children()
            .iter()
            .all(|child| walk_call_tree(child, visit)),
    }
}

/// Classification of a single call frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameClass {
    /// First-party UI component, by function name
    Component(String),
    /// Third-party package, by package name
    Module(String),
    /// Framework package that is walked through but never attributed
    ExcludedModule(String),
    Unclassified,
}

/// Pluggable policy deciding what a call frame belongs to
pub trait FrameClassifier {
    fn classify(&self, frame: &CallFrame) -> FrameClass;
}

/// Name- and path-based classifier
///
/// A frame is a component when its function name matches the component
/// pattern, is not excluded and its script is not a dependency. Otherwise a
/// dependency path yields its package name.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    component: Regex,
    module: Regex,
    excluded_modules: Vec<String>,
    excluded_components: Vec<String>,
}

impl HeuristicClassifier {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, HydrationError> {
        Ok(Self {
            component: Regex::new(&config.component_pattern)?,
            module: Regex::new(&config.module_pattern)?,
            excluded_modules: config.excluded_modules.clone(),
            excluded_components: config.excluded_components.clone(),
        })
    }

    /// Package name of the innermost dependency directory in `url`
    pub fn module_name(&self, url: &str) -> Option<String> {
        self.module
            .captures_iter(url)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl FrameClassifier for HeuristicClassifier {
    fn classify(&self, frame: &CallFrame) -> FrameClass {
        if !frame.is_identifiable() {
            return FrameClass::Unclassified;
        }

        let module = self.module_name(&frame.url);
        let name = frame.function_name.as_str();

        if module.is_none()
            && self.component.is_match(name)
            && !self.excluded_components.iter().any(|c| c == name)
        {
            return FrameClass::Component(name.to_string());
        }

        match module {
            Some(m) if self.excluded_modules.contains(&m) => FrameClass::ExcludedModule(m),
            Some(m) => FrameClass::Module(m),
            None => FrameClass::Unclassified,
        }
    }
}

/// Time accumulated under one component or module name
#[derive(Debug, Clone)]
pub struct AttributionEntry<'a> {
    pub name: String,
    pub nodes: Vec<&'a CallTreeNode>,
    /// Microseconds
    pub duration: f64,
}

impl AttributionEntry<'_> {
    pub fn duration_ms(&self) -> f64 {
        self.duration / 1000.0
    }
}

/// Entries sorted by duration, descending
#[derive(Debug, Clone, Default)]
pub struct Ranking<'a> {
    pub entries: Vec<AttributionEntry<'a>>,
    pub total: f64,
}

impl<'a> Ranking<'a> {
    fn from_map(map: HashMap<String, AttributionEntry<'a>>) -> Self {
        let mut entries: Vec<AttributionEntry<'a>> = map.into_values().collect();
        entries.sort_by(|a, b| {
            b.duration
                .total_cmp(&a.duration)
                .then_with(|| a.name.cmp(&b.name))
        });
        let total = entries.iter().map(|e| e.duration).sum();
        Self { entries, total }
    }

    /// Percentage of the ranking total taken by `entry`
    pub fn share(&self, entry: &AttributionEntry<'_>) -> f64 {
        if self.total > 0.0 {
            entry.duration / self.total * 100.0
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Component and module rankings for one call tree
#[derive(Debug, Clone, Default)]
pub struct Attribution<'a> {
    pub components: Ranking<'a>,
    pub modules: Ranking<'a>,
}

fn accumulate<'a>(
    map: &mut HashMap<String, AttributionEntry<'a>>,
    name: String,
    node: &'a CallTreeNode,
) {
    let entry = map.entry(name.clone()).or_insert_with(|| AttributionEntry {
        name,
        nodes: Vec::new(),
        duration: 0.0,
    });
    entry.nodes.push(node);
    entry.duration += node.total_time;
}

/// Attribute the time in `root` to components and modules
///
/// **Public** - the attribution pass of the hydration analyzer
///
/// Matching nodes take their whole subtree and the walk does not descend
/// beneath them, so nested components count toward the outermost one.
pub fn attribute<'a>(root: &'a CallTreeNode, classifier: &dyn FrameClassifier) -> Attribution<'a> {
    let mut components = HashMap::new();
    let mut modules = HashMap::new();

    walk_call_tree(root, &mut |node: &'a CallTreeNode| {
        match classifier.classify(&node.frame) {
            FrameClass::Component(name) => {
                accumulate(&mut components, name, node);
                VisitAction::SkipChildren
            }
            FrameClass::Module(name) => {
                accumulate(&mut modules, name, node);
                VisitAction::SkipChildren
            }
            FrameClass::ExcludedModule(_) | FrameClass::Unclassified => VisitAction::Continue,
        }
    });

    Attribution {
        components: Ranking::from_map(components),
        modules: Ranking::from_map(modules),
    }
}
