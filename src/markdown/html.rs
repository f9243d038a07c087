//! The raw HTML subset the compiler understands.
//!
//! Raw tags are never copied to the output. They are tokenized here so the
//! compiler can pull out the few attributes it uses (`src`, `alt`, `href`,
//! `align`) and re-emit markup of its own.

/// A tokenized start tag such as `<img src="x" alt=y>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StartTag<'a> {
    /// Lower-cased tag name.
    pub name: String,
    attrs: Vec<(String, &'a str)>,
}

impl<'a> StartTag<'a> {
    /// Tokenize `raw`, which must span from `<` to the first `>`.
    ///
    /// Returns `None` for closing tags and for text that does not start with
    /// a tag name.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
        let name_len = inner
            .find(|c: char| !is_word_char(c))
            .unwrap_or(inner.len());
        if name_len == 0 {
            return None;
        }
        let name = inner[..name_len].to_ascii_lowercase();

        let mut attrs = Vec::new();
        let mut rest = &inner[name_len..];
        loop {
            rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
            if rest.is_empty() {
                break;
            }
            let key_len = rest
                .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
                .unwrap_or(rest.len());
            if key_len == 0 {
                // Stray `=`.
                rest = &rest[1..];
                continue;
            }
            let key = rest[..key_len].to_ascii_lowercase();
            rest = &rest[key_len..];

            match rest.trim_start().strip_prefix('=') {
                Some(after_eq) => {
                    let (value, remainder) = split_attr_value(after_eq.trim_start());
                    attrs.push((key, value));
                    rest = remainder;
                }
                None => attrs.push((key, "")),
            }
        }

        Some(Self { name, attrs })
    }

    /// Value of the first attribute called `name` (lower-case).
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }
}

fn split_attr_value(input: &str) -> (&str, &str) {
    match input.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &input[1..];
            match body.find(quote) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        _ => {
            let end = input.find(char::is_whitespace).unwrap_or(input.len());
            (&input[..end], &input[end..])
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `raw` opens a `name` tag: `<name` followed by a non-word character.
pub(super) fn opens_tag(raw: &str, name: &str) -> bool {
    tag_name_after(raw, "<", name)
}

/// Whether `raw` closes a `name` tag: `</name` followed by a non-word character.
pub(super) fn closes_tag(raw: &str, name: &str) -> bool {
    tag_name_after(raw, "</", name)
}

fn tag_name_after(raw: &str, prefix: &str, name: &str) -> bool {
    let Some(rest) = raw.strip_prefix(prefix) else {
        return false;
    };
    match rest.get(..name.len()) {
        Some(candidate) if candidate.eq_ignore_ascii_case(name) => {
            !rest[name.len()..].starts_with(is_word_char)
        }
        _ => false,
    }
}

/// ASCII case-insensitive substring search.
pub(super) fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Tags that may open an HTML block.
const BLOCK_TAGS: [&str; 7] = ["h1", "h2", "h3", "h4", "h5", "h6", "p"];

fn block_tag_name(trimmed: &str) -> Option<&'static str> {
    BLOCK_TAGS.into_iter().find(|name| opens_tag(trimmed, name))
}

/// Whether a (left-trimmed) line starts an HTML heading or paragraph block.
pub(super) fn starts_html_block(trimmed: &str) -> bool {
    block_tag_name(trimmed).is_some()
}

/// An `<hN>` or `<p>` block lifted out of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct HtmlBlock {
    /// `"p"` or `"h1"`..`"h6"`.
    pub tag: &'static str,
    /// Value of the `align` attribute, when one of `left`, `center`, `right`.
    pub align: Option<&'static str>,
    /// Inner markup with wrapped lines joined; still to be inline-parsed.
    pub inner: String,
    /// Index of the first line after the block.
    pub next: usize,
}

impl HtmlBlock {
    /// Heading depth for `<hN>` blocks.
    pub fn heading_depth(&self) -> Option<u8> {
        self.tag
            .strip_prefix('h')
            .and_then(|digit| digit.parse().ok())
    }

    /// ` style="text-align: …"`, or nothing.
    pub fn style_attr(&self) -> String {
        self.align
            .map(|align| format!(r#" style="text-align: {align}""#))
            .unwrap_or_default()
    }
}

/// Try to read an HTML block starting at `lines[start]`.
///
/// The start tag must close on its first line. The matching close tag may be
/// on any later line; without one, the line is not an HTML block.
pub(super) fn parse_html_block(lines: &[&str], start: usize) -> Option<HtmlBlock> {
    let line = lines.get(start)?.trim_start();
    let tag = block_tag_name(line)?;
    let gt = line.find('>')?;
    let align = StartTag::parse(&line[..=gt])
        .and_then(|t| t.attr("align"))
        .and_then(normalize_align);

    let close = format!("</{tag}>");
    let after = &line[gt + 1..];
    if let Some(end) = find_ignore_ascii_case(after, &close) {
        return Some(HtmlBlock {
            tag,
            align,
            inner: crate::text::collapse_inline_whitespace(&after[..end]),
            next: start + 1,
        });
    }

    let mut parts = vec![after];
    for (idx, next_line) in lines.iter().enumerate().skip(start + 1) {
        if let Some(end) = find_ignore_ascii_case(next_line, &close) {
            parts.push(&next_line[..end]);
            return Some(HtmlBlock {
                tag,
                align,
                inner: crate::text::collapse_inline_whitespace(&parts.join("\n")),
                next: idx + 1,
            });
        }
        parts.push(next_line);
    }
    None
}

fn normalize_align(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" => Some("left"),
        "center" => Some("center"),
        "right" => Some("right"),
        _ => None,
    }
}
