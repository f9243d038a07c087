//! Inline parser: emphasis, code, links, images and the raw-tag allow-list.
//!
//! A single forward cursor walks the text. At each position the constructs
//! below are tried in order; when none matches, exactly one character is
//! escaped and the cursor moves on. Unknown markup therefore always ends up
//! as visible, escaped text.

use super::html::{StartTag, closes_tag, find_ignore_ascii_case, opens_tag};
use super::urls::{HashShorthand, UrlKind, rewrite_href, safe_url};
use super::{CompileContext, assets};
use crate::text::{escape_html, is_br_only_line, push_escaped_char};

/// Render one line (or joined paragraph) of inline Markdown to HTML.
pub(super) fn render_inline(text: &str, ctx: &CompileContext<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    push_inline(text, ctx, &mut out);
    out
}

fn push_inline(text: &str, ctx: &CompileContext<'_>, out: &mut String) {
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let consumed = strong(rest, ctx, out)
            .or_else(|| emphasis(rest, ctx, out))
            .or_else(|| code_span(rest, out))
            .or_else(|| markdown_image(rest, ctx, out))
            .or_else(|| markdown_link(rest, ctx, out))
            .or_else(|| raw_tag(rest, ctx, out));

        match consumed {
            Some(len) => i += len,
            None => {
                // Fallback: escape a single character.
                let Some(c) = rest.chars().next() else { break };
                push_escaped_char(out, c);
                i += c.len_utf8();
            }
        }
    }
}

fn strong(rest: &str, ctx: &CompileContext<'_>, out: &mut String) -> Option<usize> {
    let body = rest.strip_prefix("**")?;
    match body.find("**") {
        Some(end) => {
            out.push_str("<strong>");
            push_inline(&body[..end], ctx, out);
            out.push_str("</strong>");
            Some(2 + end + 2)
        }
        None => {
            out.push_str("**");
            Some(2)
        }
    }
}

fn emphasis(rest: &str, ctx: &CompileContext<'_>, out: &mut String) -> Option<usize> {
    let body = rest.strip_prefix('*')?;
    let end = body.find('*')?;
    out.push_str("<em>");
    push_inline(&body[..end], ctx, out);
    out.push_str("</em>");
    Some(1 + end + 1)
}

fn code_span(rest: &str, out: &mut String) -> Option<usize> {
    let body = rest.strip_prefix('`')?;
    let end = body.find('`')?;
    out.push_str("<code>");
    out.push_str(&escape_html(&body[..end]));
    out.push_str("</code>");
    Some(1 + end + 1)
}

/// Split `[label](target)` at the start of `s` into `(label, target, len)`.
fn bracket_target(s: &str) -> Option<(&str, &str, usize)> {
    let body = s.strip_prefix('[')?;
    let close = body.find(']')?;
    let after = body[close + 1..].strip_prefix('(')?;
    let paren = after.find(')')?;
    // `[` + label + `](` + target + `)`
    let len = 1 + close + 2 + paren + 1;
    Some((&body[..close], &after[..paren], len))
}

fn markdown_image(rest: &str, ctx: &CompileContext<'_>, out: &mut String) -> Option<usize> {
    let (alt, target, len) = bracket_target(rest.strip_prefix('!')?)?;
    push_image(target, alt, ctx, out);
    Some(1 + len)
}

fn markdown_link(rest: &str, ctx: &CompileContext<'_>, out: &mut String) -> Option<usize> {
    let (label, target, len) = bracket_target(rest)?;
    let href = rewrite_href(target, ctx, HashShorthand::Anchor);
    out.push_str(r#"<a href=""#);
    out.push_str(&escape_html(&href));
    out.push_str(r#"">"#);
    push_inline(label, ctx, out);
    out.push_str("</a>");
    Some(len)
}

/// Images share one rendering path whether they came from Markdown or `<img>`.
fn push_image(target: &str, alt: &str, ctx: &CompileContext<'_>, out: &mut String) {
    let src = safe_url(target, UrlKind::Src);
    let src = match assets::resolve_asset_rel_path(src, ctx) {
        Some(resolved) => assets::to_asset_url(&resolved, ctx),
        None => src.to_string(),
    };
    out.push_str(&format!(
        r#"<img src="{}" alt="{}" loading="lazy" />"#,
        escape_html(&src),
        escape_html(alt)
    ));
}

/// The raw-HTML allow-list: `<br>`, `<img>`, `<a>`, `<span>`.
fn raw_tag(rest: &str, ctx: &CompileContext<'_>, out: &mut String) -> Option<usize> {
    if !rest.starts_with('<') {
        return None;
    }
    let tag_len = rest.find('>')? + 1;
    let raw = &rest[..tag_len];

    if is_br_only_line(raw) {
        out.push_str("<br />");
        return Some(tag_len);
    }

    if opens_tag(raw, "img") {
        let tag = StartTag::parse(raw)?;
        push_image(
            tag.attr("src").unwrap_or_default(),
            tag.attr("alt").unwrap_or_default(),
            ctx,
            out,
        );
        return Some(tag_len);
    }

    if opens_tag(raw, "a") {
        let after = &rest[tag_len..];
        let close = find_ignore_ascii_case(after, "</a>")?;
        let tag = StartTag::parse(raw)?;
        let href = rewrite_href(tag.attr("href").unwrap_or_default(), ctx, HashShorthand::Route);
        out.push_str(r#"<a href=""#);
        out.push_str(&escape_html(&href));
        out.push_str(r#"">"#);
        push_inline(&after[..close], ctx, out);
        out.push_str("</a>");
        return Some(tag_len + close + "</a>".len());
    }

    if opens_tag(raw, "span") {
        let after = &rest[tag_len..];
        return match find_ignore_ascii_case(after, "</span>") {
            Some(close) => {
                push_inline(&after[..close], ctx, out);
                Some(tag_len + close + "</span>".len())
            }
            None => Some(tag_len),
        };
    }

    if closes_tag(raw, "span") {
        return Some(tag_len);
    }

    None
}
