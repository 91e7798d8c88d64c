//! CLI output formatting for all pipeline stages.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ## Scan
//!
//! ```text
//! Documents
//!     getting-started  Getting Started
//!     guide/install    Installation
//! Assets
//!     img/logo.svg
//! ```
//!
//! ## Build
//!
//! ```text
//! Sidebar: docs
//!     Getting Started
//!     guide
//!         Installation
//!
//! Routes
//!     /                      -> index (en)
//!     /getting-started       -> getting-started (en)
//!     /fr/getting-started    -> getting-started (fr, translated)
//!
//! Emitted 12 routes (2 locales, 1 sidebar)
//! ```

use crate::pipeline::BuildOutput;
use crate::sidebar::SidebarEntry;
use crate::types::ContentNode;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format the scanned node inventory, documents first, then assets.
pub fn format_scan_output(nodes: &[ContentNode]) -> Vec<String> {
    let mut lines = Vec::new();
    let docs: Vec<&ContentNode> = nodes.iter().filter(|n| n.is_document()).collect();
    let assets: Vec<&ContentNode> = nodes.iter().filter(|n| !n.is_document()).collect();

    let width = docs.iter().map(|n| n.id.len()).max().unwrap_or(0);
    lines.push("Documents".to_string());
    for node in &docs {
        lines.push(format!("{}{:<width$}  {}", indent(1), node.id, node.title));
    }
    if !assets.is_empty() {
        lines.push("Assets".to_string());
        for node in &assets {
            lines.push(format!("{}{}", indent(1), node.source_path));
        }
    }
    lines
}

fn format_sidebar_entries(entries: &[SidebarEntry], depth: usize, lines: &mut Vec<String>) {
    for entry in entries {
        match entry {
            SidebarEntry::Doc { label, .. } => {
                lines.push(format!("{}{}", indent(depth), label));
            }
            SidebarEntry::Category { label, items } => {
                lines.push(format!("{}{}", indent(depth), label));
                format_sidebar_entries(items, depth + 1, lines);
            }
        }
    }
}

/// Format the full build result: sidebars, routes, summary line.
pub fn format_build_output(output: &BuildOutput) -> Vec<String> {
    let mut lines = Vec::new();

    for sidebar in &output.sidebars {
        lines.push(format!("Sidebar: {}", sidebar.name));
        format_sidebar_entries(&sidebar.entries, 1, &mut lines);
        lines.push(String::new());
    }

    lines.push("Routes".to_string());
    let width = output
        .routes
        .routes
        .keys()
        .map(String::len)
        .max()
        .unwrap_or(0);
    for (path, desc) in &output.routes.routes {
        let mut detail = desc.locale.clone();
        if desc.translated {
            detail.push_str(", translated");
        }
        lines.push(format!(
            "{}{:<width$}  -> {} ({})",
            indent(1),
            path,
            desc.id,
            detail
        ));
    }
    lines.push(String::new());

    let locale_word = if output.report.locales == 1 {
        "locale"
    } else {
        "locales"
    };
    let sidebar_word = if output.report.sidebars == 1 {
        "sidebar"
    } else {
        "sidebars"
    };
    lines.push(format!(
        "Emitted {} routes ({} {locale_word}, {} {sidebar_word})",
        output.report.routes, output.report.locales, output.report.sidebars
    ));
    lines
}

/// Format `warn`-policy broken links, one per line.
pub fn format_warnings(output: &BuildOutput) -> Vec<String> {
    output
        .report
        .warnings
        .iter()
        .map(|b| format!("warning: broken link {b}"))
        .collect()
}

pub fn print_scan_output(nodes: &[ContentNode]) {
    for line in format_scan_output(nodes) {
        println!("{line}");
    }
}

pub fn print_build_output(output: &BuildOutput) {
    for line in format_build_output(output) {
        println!("{line}");
    }
    for line in format_warnings(output) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline;
    use crate::test_helpers::*;

    #[test]
    fn scan_output_lists_documents_then_assets() {
        let tmp = setup_fixtures();
        let nodes = crate::scan::scan(tmp.path()).unwrap();
        let lines = format_scan_output(&nodes);
        assert_eq!(lines[0], "Documents");
        let assets_at = lines.iter().position(|l| l == "Assets").unwrap();
        assert!(lines[assets_at + 1].contains("img/logo.svg"));
    }

    #[test]
    fn build_output_has_summary_line() {
        let tmp = setup_fixtures();
        let output = pipeline::build(tmp.path()).unwrap();
        let lines = format_build_output(&output);
        let last = lines.last().unwrap();
        assert!(last.starts_with("Emitted "), "got: {last}");
        assert!(last.contains("routes"));
    }

    #[test]
    fn sidebar_tree_indented_by_depth() {
        let tmp = setup_fixtures();
        let output = pipeline::build(tmp.path()).unwrap();
        let lines = format_build_output(&output);
        assert!(lines.iter().any(|l| l.starts_with("Sidebar: ")));
        // Nested categories produce deeper indentation somewhere.
        assert!(lines.iter().any(|l| l.starts_with("        ")));
    }

    #[test]
    fn warnings_formatted_one_per_line() {
        let tmp = setup_fixtures();
        override_config(tmp.path(), "on_broken_links = \"warn\"");
        std::fs::write(tmp.path().join("broken.md"), "[x](/docs/nope)\n").unwrap();
        let output = pipeline::build(tmp.path()).unwrap();
        let lines = format_warnings(&output);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("/docs/nope"));
    }
}
