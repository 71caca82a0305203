//! Terminal rendering of measurement and hydration findings.

use crate::hydration::{Attribution, Ranking};
use crate::parser::schema::{LayoutShiftRecord, NodeDiff, ReflowEntry};
use crate::utils::config::COLUMN_DISPLAY_THRESHOLD;
use colored::*;

const RULE: &str = "---------------------------------------------------\n";

/// Full console report: reflows first, then layout shifts
///
/// **Public** - what `reflow-trace` prints after a run
///
/// # Arguments
/// * `reflows` - Aggregated entries, already sorted
/// * `shifts` - Tracked layout shifts
/// * `top` - Print at most this many reflow locations (`None` prints all)
pub fn render_measurement(
    reflows: &[ReflowEntry],
    shifts: &[LayoutShiftRecord],
    top: Option<usize>,
) -> String {
    let mut out = String::new();
    out.push_str(&render_reflows(reflows, top));
    out.push_str(&render_layout_shifts(shifts));
    out
}

pub fn render_reflows(reflows: &[ReflowEntry], top: Option<usize>) -> String {
    let mut out = section_header("🔁 ", "Style Recalculates / Layout Reflows");

    if reflows.is_empty() {
        out.push_str("No style recalculations with a source location were recorded.\n");
        return out;
    }

    let limit = top.unwrap_or(reflows.len());
    for entry in reflows.iter().take(limit) {
        out.push_str(&format_reflow(entry));
        out.push('\n');
    }
    if reflows.len() > limit {
        out.push_str(&format!(
            "  (Showing top {} of {} locations)\n",
            limit,
            reflows.len()
        ));
    }
    out
}

/// One reflow line: count, total time, function and location
pub fn format_reflow(entry: &ReflowEntry) -> String {
    let noun = if entry.count == 1 { "reflow" } else { "reflows" };
    let mut line = format!(
        "  {:>4} {:<8} {} ",
        entry.count,
        noun,
        format!("{:>9.2} ms", entry.duration_ms()).yellow()
    );
    if !entry.function_name.is_empty() {
        line.push_str(&entry.function_name.bold().to_string());
        line.push(' ');
    }
    line.push_str(&format_location(entry).dimmed().to_string());
    line
}

/// `url:line`, with `:column` only when the column is past the display threshold
pub fn format_location(entry: &ReflowEntry) -> String {
    if entry.column_number > COLUMN_DISPLAY_THRESHOLD {
        format!(
            "{}:{}:{}",
            entry.url, entry.line_number, entry.column_number
        )
    } else {
        format!("{}:{}", entry.url, entry.line_number)
    }
}

pub fn render_layout_shifts(shifts: &[LayoutShiftRecord]) -> String {
    let mut out = section_header("📐 ", "Layout Shifts");

    if shifts.is_empty() {
        out.push_str(&format!("{}\n", "✅ No layout shifts recorded".green()));
        return out;
    }

    for shift in shifts {
        out.push_str(&format!(
            "\n💥 {}\n",
            format!("CLS by {:.2}%", shift.value * 100.0).red().bold()
        ));
        for diff in &shift.diffs {
            out.push_str(&format!(
                "  {}\n    $x('{}')\n    {}\n",
                diff.node_name.bold(),
                diff.x_path,
                describe_movement(diff)
            ));
        }
    }
    out
}

/// Human-readable delta; the vertical axis wins when both moved
pub fn describe_movement(diff: &NodeDiff) -> String {
    if diff.y != 0.0 {
        let direction = if diff.y > 0.0 { "down" } else { "up" };
        format!("moved {} by {}px", direction, diff.y.abs())
    } else if diff.x != 0.0 {
        let direction = if diff.x > 0.0 { "right" } else { "left" };
        format!("moved {} by {}px", direction, diff.x.abs())
    } else if diff.width != 0.0 || diff.height != 0.0 {
        format!("resized by {:+}x{:+}px", diff.width, diff.height)
    } else {
        "did not move".to_string()
    }
}

/// Component and module rankings with their percentage shares
///
/// **Public** - what `reflow-hydration` prints
pub fn render_attribution(attribution: &Attribution<'_>, top: usize) -> String {
    let mut out = String::new();
    out.push_str(&render_ranking("⚛️  ", "Components", &attribution.components, top));
    out.push_str(&render_ranking("📦 ", "Modules", &attribution.modules, top));
    out
}

fn render_ranking(icon: &str, title: &str, ranking: &Ranking<'_>, top: usize) -> String {
    let mut out = section_header(icon, title);

    if ranking.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    for entry in ranking.entries.iter().take(top) {
        out.push_str(&format!(
            "  {} {:>6.2}%  {}\n",
            format!("{:>9.2} ms", entry.duration_ms()).yellow(),
            ranking.share(entry),
            entry.name
        ));
    }
    out.push_str(&format!(
        "  {} total over {} entries\n",
        format!("{:.2} ms", ranking.total / 1000.0).bold(),
        ranking.len()
    ));
    out
}

fn section_header(icon: &str, title: &str) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(icon);
    out.push_str(&title.bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(x: f64, y: f64) -> NodeDiff {
        NodeDiff {
            node_name: "div > p".to_string(),
            x_path: "/html[1]/body[1]/p[1]".to_string(),
            x,
            y,
            width: 0.0,
            height: 0.0,
        }
    }

    #[test]
    fn vertical_axis_is_checked_first() {
        assert_eq!(describe_movement(&diff(20.0, -15.0)), "moved up by 15px");
        assert_eq!(describe_movement(&diff(20.0, 0.0)), "moved right by 20px");
        assert_eq!(describe_movement(&diff(-3.0, 0.0)), "moved left by 3px");
        assert_eq!(describe_movement(&diff(0.0, 8.5)), "moved down by 8.5px");
    }

    #[test]
    fn pure_resize_is_described() {
        let mut d = diff(0.0, 0.0);
        d.height = 40.0;
        assert_eq!(describe_movement(&d), "resized by +0x+40px");
    }
}
