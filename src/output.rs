//! CLI output formatting.
//!
//! Output is **page-centric**: every page leads with its positional index
//! and title, followed by `→` and its route. Heading anchors are listed
//! underneath, indented one level per heading depth below `h2`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 001 Home → /
//! 002 Setup → /guide/setup
//!     #install Install
//!         #linux Linux
//!
//! Checked 2 page(s), 2 heading(s)
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 Home → /
//! 002 Setup → /guide/setup
//!
//! Generated 2 page(s) from "docs" -> /work/src/generated/docs.json (assets: 3)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::GenerateSummary;
use crate::types::{CompiledPage, Manifest};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 Title → /slug`
fn page_header(index: usize, page: &CompiledPage) -> String {
    format!("{} {} \u{2192} {}", format_index(index), page.title, page.slug)
}

fn plural_pages(n: usize) -> &'static str {
    if n == 1 { "page" } else { "pages" }
}

// ============================================================================
// Check
// ============================================================================

/// Format the `check` command output: every page with its heading outline.
pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();
    let mut heading_count = 0;

    for (i, page) in manifest.pages.iter().enumerate() {
        lines.push(page_header(i + 1, page));
        for heading in &page.headings {
            let depth = usize::from(heading.depth.saturating_sub(1)).max(1);
            lines.push(format!("{}#{} {}", indent(depth), heading.id, heading.text));
            heading_count += 1;
        }
    }

    if !manifest.pages.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {} page(s), {} heading(s)",
        manifest.pages.len(),
        heading_count
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the `generate` command output.
///
/// `input_display` is the input directory as the user gave it; the manifest
/// path is shown absolute.
pub fn format_generate_output(summary: &GenerateSummary, input_display: &str) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .manifest
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| page_header(i + 1, page))
        .collect();

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Generated {} page(s) from \"{}\" -> {} (assets: {})",
        summary.page_count(),
        input_display,
        summary.manifest_path.display(),
        summary.asset_count
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(summary: &GenerateSummary, input_display: &str) {
    for line in format_generate_output(summary, input_display) {
        println!("{}", line);
    }
}

// ============================================================================
// Watch
// ============================================================================

/// One-line status after a watch-triggered rebuild.
pub fn format_rebuild_output(summary: &GenerateSummary) -> String {
    format!(
        "Rebuilt {} {} -> {}",
        summary.page_count(),
        plural_pages(summary.page_count()),
        summary.manifest_path.display()
    )
}

/// Print the watch banner to stdout.
pub fn print_watch_banner(input_display: &str) {
    println!("Watching \"{}\" for changes (Ctrl+C to stop)", input_display);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeadingEntry;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn page(slug: &str, title: &str, headings: Vec<HeadingEntry>) -> CompiledPage {
        CompiledPage {
            slug: slug.to_string(),
            title: title.to_string(),
            html: String::new(),
            headings,
        }
    }

    fn heading(depth: u8, id: &str, text: &str) -> HeadingEntry {
        HeadingEntry {
            depth,
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    fn manifest(pages: Vec<CompiledPage>) -> Manifest {
        Manifest {
            input_dir: "docs".to_string(),
            pages,
        }
    }

    fn summary(pages: Vec<CompiledPage>, manifest_path: &str) -> GenerateSummary {
        GenerateSummary {
            manifest: manifest(pages),
            asset_count: 3,
            manifest_path: PathBuf::from(manifest_path),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(1234), "1234");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_lists_pages_and_headings() {
        let m = manifest(vec![
            page("/", "Home", vec![]),
            page(
                "/guide/setup",
                "Setup",
                vec![heading(2, "install", "Install"), heading(3, "linux", "Linux")],
            ),
        ]);
        assert_eq!(
            format_check_output(&m),
            vec![
                "001 Home \u{2192} /",
                "002 Setup \u{2192} /guide/setup",
                "    #install Install",
                "        #linux Linux",
                "",
                "Checked 2 page(s), 2 heading(s)",
            ]
        );
    }

    #[test]
    fn check_empty_manifest() {
        assert_eq!(
            format_check_output(&manifest(vec![])),
            vec!["Checked 0 page(s), 0 heading(s)"]
        );
    }

    // =========================================================================
    // Generate
    // =========================================================================

    #[test]
    fn generate_summary_line() {
        let s = summary(
            vec![page("/", "Home", vec![]), page("/a", "A", vec![])],
            "/work/src/generated/docs.json",
        );
        assert_eq!(
            format_generate_output(&s, "docs"),
            vec![
                "001 Home \u{2192} /",
                "002 A \u{2192} /a",
                "",
                "Generated 2 page(s) from \"docs\" -> /work/src/generated/docs.json (assets: 3)",
            ]
        );
    }

    #[test]
    fn generate_with_no_pages_is_just_the_summary() {
        let s = summary(vec![], "/tmp/docs.json");
        assert_eq!(
            format_generate_output(&s, "docs"),
            vec!["Generated 0 page(s) from \"docs\" -> /tmp/docs.json (assets: 3)"]
        );
    }

    // =========================================================================
    // Watch
    // =========================================================================

    #[test]
    fn rebuild_line_pluralizes() {
        let one = summary(vec![page("/", "Home", vec![])], "/work/docs.json");
        assert_eq!(
            format_rebuild_output(&one),
            "Rebuilt 1 page -> /work/docs.json"
        );
        let none = summary(vec![], "/work/docs.json");
        assert_eq!(
            format_rebuild_output(&none),
            "Rebuilt 0 pages -> /work/docs.json"
        );
    }
}
