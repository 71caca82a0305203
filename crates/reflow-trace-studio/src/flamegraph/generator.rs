//! SVG flamegraph generation for CPU call trees.
//!
//! - Frames colored by attribution class (component, module, framework)
//! - Inverted layout (root at bottom)
//! - Children ordered by total time, widest first

use crate::hydration::{CallTreeNode, FrameClass, FrameClassifier};
use crate::utils::error::FlamegraphError;
use log::info;

/// Categories for flamegraph nodes to determine colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Component,
    Module,
    Framework,
    Other,
    Root,
}

impl NodeCategory {
    pub fn from_class(class: &FrameClass) -> Self {
        match class {
            FrameClass::Component(_) => Self::Component,
            FrameClass::Module(_) => Self::Module,
            FrameClass::ExcludedModule(_) => Self::Framework,
            FrameClass::Unclassified => Self::Other,
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Component => "rgb(220, 20, 60)",   // Crimson
            Self::Module => "rgb(255, 140, 0)",      // Dark Orange
            Self::Framework => "rgb(70, 130, 180)",  // Steel Blue
            Self::Root => "rgb(75, 0, 130)",         // Indigo
            Self::Other => "rgb(169, 169, 169)",     // Gray
        }
    }
}

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Hydration CPU Profile".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate an SVG flamegraph from a call tree
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Arguments
/// * `root` - Call tree of the hydration window
/// * `classifier` - Decides each frame's color category
/// * `config` - Title and width; defaults when `None`
///
/// # Errors
/// * `FlamegraphError::EmptyTree` - The tree has no recorded time
///
/// # Example
/// ```ignore
/// let svg = generate_flamegraph(&analysis.call_tree, &classifier, None)?;
/// write_svg(&svg, "hydration.svg")?;
/// ```
pub fn generate_flamegraph(
    root: &CallTreeNode,
    classifier: &dyn FrameClassifier,
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if root.total_time <= 0.0 || !root.has_children() {
        return Err(FlamegraphError::EmptyTree);
    }

    let config = config.cloned().unwrap_or_default();
    info!(
        "Generating flamegraph for {} call tree nodes",
        root.node_count()
    );

    let max_depth = calculate_max_depth(root);

    let mut svg_content = String::new();
    let width = config.width;
    let height_per_level = 20;
    let graph_height = (max_depth + 1) * height_per_level;
    let legend_height = 80;
    let total_height = graph_height + legend_height;

    svg_content.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    ));

    svg_content.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#
    );

    svg_content.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    ));

    let mut ctx = RenderContext {
        output: &mut svg_content,
        line_height: height_per_level,
        graph_height,
        classifier,
    };

    render_node(root, 0, 0.0, width as f64, &mut ctx);
    render_legend(&mut svg_content, graph_height);

    svg_content.push_str("</svg>");

    info!(
        "Flamegraph generated successfully ({} bytes)",
        svg_content.len()
    );
    Ok(svg_content)
}

fn calculate_max_depth(node: &CallTreeNode) -> usize {
    node.children()
        .iter()
        .map(|child| calculate_max_depth(child) + 1)
        .max()
        .unwrap_or(0)
}

struct RenderContext<'a> {
    output: &'a mut String,
    line_height: usize,
    graph_height: usize,
    classifier: &'a dyn FrameClassifier,
}

fn render_node(node: &CallTreeNode, level: usize, x: f64, w: f64, ctx: &mut RenderContext) {
    if w < 0.5 {
        return;
    }

    let category = if level == 0 {
        NodeCategory::Root
    } else {
        NodeCategory::from_class(&ctx.classifier.classify(&node.frame))
    };

    // Inverted: graph bottom minus level height, plus 30px title margin
    let y = (ctx.graph_height as f64)
        - (level as f64 * ctx.line_height as f64)
        - (ctx.line_height as f64)
        + 30.0;

    let name = display_name(node);

    ctx.output.push_str(&format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{}" fill="{}" stroke="white" stroke-width="0.5" class="func">"#,
        x, y, w, ctx.line_height, category.color()
    ));
    ctx.output
        .push_str(&format!(r#"<title>{}</title></rect>"#, escape_xml(&format_tooltip(node))));

    if let Some(label) = get_truncated_name(&name, w) {
        ctx.output.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
            x, y, escape_xml(&label)
        ));
    }

    let mut children: Vec<&CallTreeNode> = node.children().iter().collect();
    children.sort_by(|a, b| b.total_time.total_cmp(&a.total_time));

    let mut current_x = x;
    for child in children {
        let child_w = (child.total_time / node.total_time) * w;
        if child_w > 0.0 {
            render_node(child, level + 1, current_x, child_w, ctx);
            current_x += child_w;
        }
    }
}

fn display_name(node: &CallTreeNode) -> String {
    if node.frame.function_name.is_empty() {
        "(anonymous)".to_string()
    } else {
        node.frame.function_name.clone()
    }
}

fn format_tooltip(node: &CallTreeNode) -> String {
    let mut tooltip = format!(
        "{}: {:.2} ms total / {:.2} ms self",
        display_name(node),
        node.total_time / 1000.0,
        node.self_time / 1000.0
    );
    if !node.frame.url.is_empty() {
        let file_name = node
            .frame
            .url
            .split('/')
            .next_back()
            .unwrap_or(&node.frame.url);
        tooltip = format!("{} | {}:{}", tooltip, file_name, node.frame.line_number + 1);
    }
    tooltip
}

/// Calculate truncated name for a node based on width
pub fn get_truncated_name(name: &str, width: f64) -> Option<String> {
    const MIN_LABEL_WIDTH: f64 = 35.0;
    const CHAR_WIDTH: f64 = 7.0;

    if width <= MIN_LABEL_WIDTH || name.is_empty() {
        return None;
    }

    let max_chars = (width / CHAR_WIDTH) as usize;
    if name.chars().count() > max_chars && max_chars > 3 {
        let kept: String = name.chars().take(max_chars - 3).collect();
        Some(format!("{}...", kept))
    } else {
        Some(name.to_string())
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_legend(out: &mut String, graph_height: usize) {
    let legend_y = graph_height + 50;

    out.push_str(&format!(
        r#"<text x="10" y="{}" font-size="14" font-weight="bold">Legend:</text>"#,
        legend_y
    ));

    let items = [
        ("Component", NodeCategory::Component),
        ("Module", NodeCategory::Module),
        ("Framework", NodeCategory::Framework),
        ("Other", NodeCategory::Other),
    ];

    for (i, (label, category)) in items.iter().enumerate() {
        let x = 80 + (i * 120);
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="15" height="15" fill="{}" rx="2"/>"#,
            x,
            legend_y - 12,
            category.color()
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 20,
            legend_y,
            label
        ));
    }
}
