//! Page title extraction.
//!
//! First match wins:
//!
//! 1. `title:` in a leading `---` frontmatter block
//! 2. the first HTML `<h1>` with visible text
//! 3. the first ATX `# heading`
//! 4. the humanized file name (`getting-started.md` → "Getting started")

use regex::Regex;
use std::sync::LazyLock;

use crate::naming::humanize_file_name;
use crate::text::{collapse_whitespace, normalize_newlines};

static FRONTMATTER_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---\s*\n((?s:.*?))\n---\s*\n").expect("valid regex"));
static FRONTMATTER_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*title:[ \t]*(.*?)[ \t]*$").expect("valid regex"));
static HTML_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ATX_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+?)\s*$").expect("valid regex"));

/// Title declared in frontmatter, if any. One pair of surrounding quotes is dropped.
pub fn frontmatter_title(markdown: &str) -> Option<String> {
    let block = FRONTMATTER_BLOCK.captures(markdown)?;
    let title = FRONTMATTER_TITLE.captures(block.get(1)?.as_str())?;
    let raw = title[1].trim();
    let raw = raw.strip_prefix(['"', '\'']).unwrap_or(raw);
    let raw = raw.strip_suffix(['"', '\'']).unwrap_or(raw);
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Text of the first `<h1>…</h1>` that has any after removing tags.
pub fn html_h1_title(markdown: &str) -> Option<String> {
    HTML_H1.captures_iter(markdown).find_map(|caps| {
        let text = collapse_whitespace(&TAG.replace_all(&caps[1], " "));
        (!text.is_empty()).then_some(text)
    })
}

/// Text of the first `# heading` line.
pub fn atx_h1_title(markdown: &str) -> Option<String> {
    ATX_H1
        .captures(markdown)
        .map(|caps| caps[1].trim().to_string())
}

/// Resolve the display title of a document.
///
/// ```
/// use pagebake::title::extract_title;
///
/// assert_eq!(extract_title("---\ntitle: Hello\n---\n# Other", "a.md"), "Hello");
/// assert_eq!(extract_title("# Welcome\n", "a.md"), "Welcome");
/// assert_eq!(extract_title("no heading", "getting-started.md"), "Getting started");
/// ```
pub fn extract_title(markdown: &str, file_name: &str) -> String {
    let markdown = normalize_newlines(markdown);
    frontmatter_title(&markdown)
        .or_else(|| html_h1_title(&markdown))
        .or_else(|| atx_h1_title(&markdown))
        .unwrap_or_else(|| humanize_file_name(file_name))
}
