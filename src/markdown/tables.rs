//! Pipe tables.
//!
//! ```text
//! | Name | Value |
//! |:-----|------:|
//! | `a|b` | 1 |
//! ```
//!
//! A table needs a header row and a separator row with the same non-zero
//! number of cells. Pipes inside backtick code spans or escaped as `\|` do
//! not split cells.

use super::CompileContext;
use super::blocks::interrupts_table_row;
use super::inline::render_inline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    fn from_separator(cell: &str) -> Self {
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Self::Center,
            (false, true) => Self::Right,
            (true, false) => Self::Left,
            (false, false) => Self::None,
        }
    }

    fn style_attr(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Left => r#" style="text-align: left""#,
            Self::Center => r#" style="text-align: center""#,
            Self::Right => r#" style="text-align: right""#,
        }
    }
}

/// Split a table row into trimmed cells.
pub(super) fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_code = false;
    let mut prev = None;
    for c in trimmed.chars() {
        let escaped = prev == Some('\\');
        match c {
            '`' if !escaped => {
                in_code = !in_code;
                current.push(c);
            }
            '|' if !in_code && !escaped => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
        prev = Some(c);
    }
    cells.push(current);

    cells
        .into_iter()
        .map(|cell| cell.trim().replace("\\|", "|"))
        .collect()
}

fn is_separator_cell(cell: &str) -> bool {
    let body = cell.strip_prefix(':').unwrap_or(cell);
    let body = body.strip_suffix(':').unwrap_or(body);
    body.len() >= 3 && body.bytes().all(|b| b == b'-')
}

/// Header cells and column alignments, if `lines[start]` opens a table.
fn table_head(lines: &[&str], start: usize) -> Option<(Vec<String>, Vec<Align>)> {
    let header_line = lines.get(start)?;
    let separator_line = lines.get(start + 1)?;
    if !header_line.contains('|') || !separator_line.contains('|') {
        return None;
    }

    let header = split_row(header_line);
    let separators = split_row(separator_line);
    if header.is_empty()
        || header.len() != separators.len()
        || header.iter().all(|cell| cell.is_empty())
        || !separators.iter().all(|cell| is_separator_cell(cell))
    {
        return None;
    }

    let aligns = separators.iter().map(|cell| Align::from_separator(cell)).collect();
    Some((header, aligns))
}

/// Whether a table starts at `lines[start]`.
pub(super) fn is_table_start(lines: &[&str], start: usize) -> bool {
    table_head(lines, start).is_some()
}

/// Render the table starting at `lines[start]`.
///
/// Returns the HTML and the index of the first line after the table.
pub(super) fn parse_table(
    lines: &[&str],
    start: usize,
    ctx: &CompileContext<'_>,
) -> Option<(String, usize)> {
    let (header, aligns) = table_head(lines, start)?;
    let width = header.len();

    let mut html = String::from("<table><thead><tr>");
    for (cell, align) in header.iter().zip(&aligns) {
        push_cell(&mut html, "th", cell, *align, ctx);
    }
    html.push_str("</tr></thead><tbody>");

    let mut next = start + 2;
    while let Some(line) = lines.get(next) {
        if !line.contains('|') || interrupts_table_row(line.trim()) {
            break;
        }
        let mut row = split_row(line);
        row.resize(width, String::new());

        html.push_str("<tr>");
        for (cell, align) in row.iter().zip(&aligns) {
            push_cell(&mut html, "td", cell, *align, ctx);
        }
        html.push_str("</tr>");
        next += 1;
    }

    html.push_str("</tbody></table>");
    Some((html, next))
}

fn push_cell(html: &mut String, tag: &str, text: &str, align: Align, ctx: &CompileContext<'_>) {
    html.push_str(&format!(
        "<{tag}{}>{}</{tag}>",
        align.style_attr(),
        render_inline(text, ctx)
    ));
}
