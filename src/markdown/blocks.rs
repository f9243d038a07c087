//! Block-level compiler: the line-dispatch loop.
//!
//! A forward-only cursor walks the document's lines. At each line the rules
//! in [`BLOCK_RULES`] are tried in order and the first one that applies
//! consumes one or more lines. The paragraph rule always applies, so every
//! iteration makes progress.

use std::sync::LazyLock;

use regex::Regex;

use super::headings::HeadingIdAllocator;
use super::html::{self, HtmlBlock};
use super::inline::render_inline;
use super::{CompileContext, CompileOptions, CompiledDocument, HeadingEntry, tables};
use crate::text::{
    collapse_whitespace, escape_html, is_br_only_line, sanitize_lang, strip_html_tags, strip_inline,
};

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").expect("valid regex"));
static THEMATIC_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("valid regex"));
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+").expect("valid regex"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s+").expect("valid regex"));

/// Where in the blockquote recursion a compile call sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Nesting {
    pub depth: usize,
}

impl Nesting {
    pub const TOP: Self = Self { depth: 0 };

    fn is_top(self) -> bool {
        self.depth == 0
    }

    fn inner(self) -> Self {
        Self {
            depth: self.depth + 1,
        }
    }
}

fn is_fence(trimmed: &str) -> bool {
    trimmed.starts_with("```")
}

fn is_quote(trimmed: &str) -> bool {
    trimmed.starts_with('>')
}

/// Constructs that end a table body. Raw HTML blocks do not.
pub(super) fn interrupts_table_row(trimmed: &str) -> bool {
    is_fence(trimmed)
        || ATX_HEADING.is_match(trimmed)
        || is_quote(trimmed)
        || BULLET_ITEM.is_match(trimmed)
        || ORDERED_ITEM.is_match(trimmed)
        || THEMATIC_BREAK.is_match(trimmed)
}

/// Whether `lines[idx]` ends a running paragraph.
fn interrupts_paragraph(lines: &[&str], idx: usize) -> bool {
    let trimmed = lines[idx].trim();
    trimmed.is_empty()
        || is_br_only_line(trimmed)
        || html::starts_html_block(trimmed)
        || tables::is_table_start(lines, idx)
        || interrupts_table_row(trimmed)
}

struct BlockCompiler<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    ctx: &'a CompileContext<'a>,
    options: &'a CompileOptions,
    nesting: Nesting,
    ids: HeadingIdAllocator,
    title_suppressed: bool,
    blocks: Vec<String>,
    headings: Vec<HeadingEntry>,
}

impl<'a> BlockCompiler<'a> {
    fn current(&self) -> &'a str {
        self.lines[self.pos]
    }

    fn current_trimmed(&self) -> &'a str {
        self.lines[self.pos].trim()
    }

    /// Allocate an id, then either swallow the heading as the page title or
    /// emit it (recording depth ≥ 2 in the TOC).
    fn push_heading(&mut self, depth: u8, text: String, inner_html: String, style: &str) {
        let id = self.ids.allocate(&text);

        if depth == 1 && self.nesting.is_top() && !self.title_suppressed {
            self.title_suppressed = true;
            return;
        }

        self.blocks.push(format!(
            r#"<h{depth} id="{}"{style}>{inner_html}</h{depth}>"#,
            escape_html(&id)
        ));
        if depth >= 2 {
            self.headings.push(HeadingEntry { depth, id, text });
        }
    }
}

type BlockRule = fn(&mut BlockCompiler<'_>) -> bool;

/// Block rules in priority order.
const BLOCK_RULES: [BlockRule; 10] = [
    skip_blank,
    fenced_code,
    html_block,
    atx_heading,
    thematic_break,
    blockquote,
    bullet_list,
    ordered_list,
    table,
    paragraph,
];

fn skip_blank(c: &mut BlockCompiler<'_>) -> bool {
    let trimmed = c.current_trimmed();
    if trimmed.is_empty() || is_br_only_line(trimmed) {
        c.pos += 1;
        return true;
    }
    false
}

fn fenced_code(c: &mut BlockCompiler<'_>) -> bool {
    let Some(info) = c.current_trimmed().strip_prefix("```") else {
        return false;
    };
    let lang = sanitize_lang(info.trim());

    let mut body = Vec::new();
    c.pos += 1;
    while c.pos < c.lines.len() && !is_fence(c.current_trimmed()) {
        body.push(escape_html(c.current()));
        c.pos += 1;
    }
    // Closing fence, if any.
    c.pos = (c.pos + 1).min(c.lines.len());

    let class = if lang.is_empty() {
        String::new()
    } else {
        format!(r#" class="language-{lang}""#)
    };
    c.blocks
        .push(format!("<pre><code{class}>{}</code></pre>", body.join("\n")));
    true
}

fn html_block(c: &mut BlockCompiler<'_>) -> bool {
    let Some(block) = html::parse_html_block(&c.lines, c.pos) else {
        return false;
    };
    c.pos = block.next;
    emit_html_block(c, block);
    true
}

fn emit_html_block(c: &mut BlockCompiler<'_>, block: HtmlBlock) {
    let text = collapse_whitespace(&strip_inline(&strip_html_tags(&block.inner)));
    let inner_html = render_inline(&block.inner, c.ctx);
    let style = block.style_attr();

    match block.heading_depth() {
        // A heading with no visible text gets no id and cannot be the title.
        Some(depth) if !text.is_empty() => c.push_heading(depth, text, inner_html, &style),
        Some(depth) => c
            .blocks
            .push(format!("<h{depth}{style}>{inner_html}</h{depth}>")),
        None if block.inner.trim().is_empty() => {}
        None => c.blocks.push(format!("<p{style}>{inner_html}</p>")),
    }
}

fn atx_heading(c: &mut BlockCompiler<'_>) -> bool {
    let Some(caps) = ATX_HEADING.captures(c.current_trimmed()) else {
        return false;
    };
    let depth = caps[1].len() as u8;
    let raw = caps[2].to_string();
    c.pos += 1;

    let text = strip_inline(&raw).trim().to_string();
    let inner_html = render_inline(&raw, c.ctx);
    c.push_heading(depth, text, inner_html, "");
    true
}

fn thematic_break(c: &mut BlockCompiler<'_>) -> bool {
    if !THEMATIC_BREAK.is_match(c.current_trimmed()) {
        return false;
    }
    c.pos += 1;
    c.blocks.push("<hr />".to_string());
    true
}

fn blockquote(c: &mut BlockCompiler<'_>) -> bool {
    if !is_quote(c.current_trimmed()) {
        return false;
    }

    let mut quoted = Vec::new();
    while c.pos < c.lines.len() && is_quote(c.current_trimmed()) {
        let line = c.current_trimmed();
        let line = &line[1..];
        let line = line
            .strip_prefix(|ch: char| ch.is_whitespace())
            .unwrap_or(line);
        quoted.push(line.to_string());
        c.pos += 1;
    }

    let inner = c.nesting.inner();
    let body = if inner.depth > c.options.max_quote_depth {
        tracing::debug!(
            depth = inner.depth,
            "blockquote nesting limit reached, flattening"
        );
        let flat = quoted.join(" ");
        let flat = flat.trim();
        if flat.is_empty() {
            String::new()
        } else {
            format!("<p>{}</p>", render_inline(flat, c.ctx))
        }
    } else {
        let nested_ctx: CompileContext<'_> = *c.ctx;
        compile_blocks(&quoted.join("\n"), &nested_ctx, c.options, inner).html
    };

    c.blocks.push(format!("<blockquote>{body}</blockquote>"));
    true
}

fn list_items(c: &mut BlockCompiler<'_>, marker: &Regex) -> Vec<String> {
    let mut items = Vec::new();
    while c.pos < c.lines.len() {
        let trimmed = c.current_trimmed();
        let Some(m) = marker.find(trimmed) else { break };
        items.push(render_inline(&trimmed[m.end()..], c.ctx));
        c.pos += 1;
    }
    items
}

fn push_list(c: &mut BlockCompiler<'_>, tag: &str, items: Vec<String>) {
    let body: String = items
        .into_iter()
        .map(|item| format!("<li>{item}</li>"))
        .collect();
    c.blocks.push(format!("<{tag}>{body}</{tag}>"));
}

fn bullet_list(c: &mut BlockCompiler<'_>) -> bool {
    if !BULLET_ITEM.is_match(c.current_trimmed()) {
        return false;
    }
    let items = list_items(c, &BULLET_ITEM);
    push_list(c, "ul", items);
    true
}

fn ordered_list(c: &mut BlockCompiler<'_>) -> bool {
    if !ORDERED_ITEM.is_match(c.current_trimmed()) {
        return false;
    }
    let items = list_items(c, &ORDERED_ITEM);
    push_list(c, "ol", items);
    true
}

fn table(c: &mut BlockCompiler<'_>) -> bool {
    let Some((html, next)) = tables::parse_table(&c.lines, c.pos, c.ctx) else {
        return false;
    };
    c.pos = next;
    c.blocks.push(html);
    true
}

/// Fallback: always consumes at least the current line.
fn paragraph(c: &mut BlockCompiler<'_>) -> bool {
    let mut parts = vec![c.current_trimmed().to_string()];
    c.pos += 1;
    while c.pos < c.lines.len() && !interrupts_paragraph(&c.lines, c.pos) {
        parts.push(c.current_trimmed().to_string());
        c.pos += 1;
    }
    let html = render_inline(&parts.join(" "), c.ctx);
    c.blocks.push(format!("<p>{html}</p>"));
    true
}

/// Compile `text` block by block.
///
/// At the top level, the first level-1 heading is taken as the page title
/// and left out of the HTML. Nested calls (blockquote bodies) keep theirs.
pub(super) fn compile_blocks(
    text: &str,
    ctx: &CompileContext<'_>,
    options: &CompileOptions,
    nesting: Nesting,
) -> CompiledDocument {
    let mut c = BlockCompiler {
        lines: text.split('\n').collect(),
        pos: 0,
        ctx,
        options,
        nesting,
        ids: HeadingIdAllocator::default(),
        title_suppressed: false,
        blocks: Vec::new(),
        headings: Vec::new(),
    };

    while c.pos < c.lines.len() {
        for rule in BLOCK_RULES {
            if rule(&mut c) {
                break;
            }
        }
    }

    CompiledDocument {
        html: c.blocks.join("\n"),
        headings: c.headings,
    }
}
