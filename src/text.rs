//! Text helpers shared by the compiler and the pipeline.
//!
//! Everything that reaches the emitted HTML through a non-trusted path goes
//! through [`escape_html`] (or [`push_escaped_char`] for the inline parser's
//! one-character fallback). The remaining helpers produce *plain text* for
//! heading ids, TOC entries and titles, never HTML.

use regex::Regex;
use std::sync::LazyLock;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---\s*\n(?s:.*?)\n---\s*\n").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]+\)").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid regex"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static LINE_BREAK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("valid regex"));
static BR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A</?br\s*/?>\z").expect("valid regex"));

/// Replace CRLF line endings with LF.
pub fn normalize_newlines(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Escape `& < > " '` to their entities.
///
/// ```
/// use pagebake::text::escape_html;
///
/// assert_eq!(escape_html("<a href='x'>&</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;");
/// ```
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        push_escaped_char(&mut out, c);
    }
    out
}

/// Append one character to `out`, escaped if it is HTML-significant.
pub fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Remove a leading `---`-delimited frontmatter block.
///
/// The closing delimiter must be followed by a newline; otherwise the input
/// is returned unchanged.
pub fn strip_frontmatter(markdown: &str) -> &str {
    match FRONTMATTER.find(markdown) {
        Some(m) => &markdown[m.end()..],
        None => markdown,
    }
}

/// Turn heading text into a URL-fragment-safe identifier.
///
/// Lowercases, spells `&` as `and`, drops everything outside `[a-z0-9]`,
/// whitespace and `-`, then joins the remaining words with single hyphens.
/// Falls back to `"section"` when nothing survives.
///
/// ```
/// use pagebake::text::slugify;
///
/// assert_eq!(slugify("Build & Deploy"), "build-and-deploy");
/// assert_eq!(slugify("  --Hello,   World!-- "), "hello-world");
/// assert_eq!(slugify("日本語"), "section");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase().replace('&', " and ");

    let mut out = String::with_capacity(lower.len());
    let mut pending_dash = false;
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    if out.is_empty() {
        "section".to_string()
    } else {
        out
    }
}

/// Strip inline Markdown markers, keeping the visible text.
///
/// Used for heading ids and TOC text, never for emitted HTML.
pub fn strip_inline(text: &str) -> String {
    let text = INLINE_CODE.replace_all(text, "$1");
    let text = STRONG.replace_all(&text, "$1");
    let text = EMPHASIS.replace_all(&text, "$1");
    let text = IMAGE.replace_all(&text, "$1");
    LINK.replace_all(&text, "$1").into_owned()
}

/// Remove anything that looks like an HTML tag.
pub fn strip_html_tags(value: &str) -> String {
    HTML_TAG.replace_all(value, "").into_owned()
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join wrapped lines: a newline and its surrounding whitespace become one space.
pub fn collapse_inline_whitespace(value: &str) -> String {
    LINE_BREAK_RUN.replace_all(value, " ").trim().to_string()
}

/// Whether a trimmed line is nothing but a `<br>` variant.
pub fn is_br_only_line(trimmed: &str) -> bool {
    BR_ONLY.is_match(trimmed)
}

/// Reduce a code fence info string to `[a-z0-9-]`.
pub fn sanitize_lang(lang: &str) -> String {
    lang.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}
