//! URL filtering and link rewriting.
//!
//! [`safe_url`] is the scheme allow-list every URL passes through first.
//! [`rewrite_href`] then turns Markdown-style targets into the hash routes the
//! single-page viewer understands: `./setup.md#install` → `#/guide/setup#install`.

use super::{CompileContext, assets};

/// Where a URL is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// Link target; app-internal `#…` and `/…` values are trusted.
    Href,
    /// Image source.
    Src,
}

/// How a bare `#fragment` link is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashShorthand {
    /// Markdown links: `#x` is an anchor on the current page (`#/page#x`).
    Anchor,
    /// Raw HTML links: `#x` is a route (`#/x`).
    Route,
}

/// Filter a URL through the scheme allow-list.
///
/// Returns the trimmed value when it is `http(s)://`, `mailto:`, a
/// scheme-less relative path, or (for [`UrlKind::Href`]) starts with `#` or
/// `/`. Anything else carrying a colon is rejected as `""`.
///
/// ```
/// use pagebake::markdown::urls::{UrlKind, safe_url};
///
/// assert_eq!(safe_url(" https://example.com ", UrlKind::Href), "https://example.com");
/// assert_eq!(safe_url("javascript:alert(1)", UrlKind::Href), "");
/// assert_eq!(safe_url("img/logo.png", UrlKind::Src), "img/logo.png");
/// ```
pub fn safe_url(raw: &str, kind: UrlKind) -> &str {
    let value = raw.trim();
    if value.is_empty() {
        return "";
    }
    if kind == UrlKind::Href && (value.starts_with('#') || value.starts_with('/')) {
        return value;
    }

    let lower = value.to_ascii_lowercase();
    if ["http://", "https://", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return value;
    }
    if lower.contains(':') {
        return "";
    }
    value
}

/// Split a link target on its first `#`. An empty fragment counts as none.
pub fn split_fragment(raw: &str) -> (&str, Option<&str>) {
    let trimmed = raw.trim();
    match trimmed.split_once('#') {
        Some((path, fragment)) => (path, (!fragment.is_empty()).then_some(fragment)),
        None => (trimmed, None),
    }
}

/// Directory part of a POSIX path, `"."` when there is none.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(pos) => &path[..pos],
        None => ".",
    }
}

/// Join `rel` onto `base_dir` and resolve `.`/`..` segments lexically.
///
/// Leading `..` segments that cannot be resolved are kept, so a path
/// escaping the root stays recognizable (`"../x"`). The empty path is `"."`.
pub fn join_normalized(base_dir: &str, rel: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in base_dir.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.last().is_some_and(|last| *last != "..") {
                    stack.pop();
                } else {
                    stack.push("..");
                }
            }
            other => stack.push(other),
        }
    }
    if stack.is_empty() {
        ".".to_string()
    } else {
        stack.join("/")
    }
}

/// Resolve a `.md` link target to the route of the document it names.
///
/// The target is resolved against the directory of the compiling document;
/// a leading `/` is ignored rather than treated as the input root.
pub fn resolve_markdown_route(target: &str, ctx: &CompileContext<'_>) -> String {
    let clean = target.strip_prefix("./").unwrap_or(target);
    let clean = clean.strip_prefix('/').unwrap_or(clean);
    let resolved = join_normalized(dirname(ctx.current_rel_path), clean);
    ctx.slugs.resolve(&resolved)
}

/// Rewrite a link target for the hash-routed viewer.
///
/// ```
/// use pagebake::markdown::CompileContext;
/// use pagebake::markdown::urls::{HashShorthand, rewrite_href};
///
/// let resolver = |rel: &str| format!("/{}", rel.trim_end_matches(".md"));
/// let ctx = CompileContext::new("guide/intro.md", "/guide/intro", &resolver);
///
/// assert_eq!(rewrite_href("setup.md#install", &ctx, HashShorthand::Anchor), "#/guide/setup#install");
/// assert_eq!(rewrite_href("#faq", &ctx, HashShorthand::Anchor), "#/guide/intro#faq");
/// assert_eq!(rewrite_href("#faq", &ctx, HashShorthand::Route), "#/faq");
/// ```
pub fn rewrite_href(target: &str, ctx: &CompileContext<'_>, mode: HashShorthand) -> String {
    let value = target.trim();
    if value.is_empty() {
        return String::new();
    }
    if value.starts_with("#/") {
        return value.to_string();
    }

    let (path, fragment) = split_fragment(value);
    let href = safe_url(path, UrlKind::Href);

    if href.to_ascii_lowercase().ends_with(".md") {
        let slug = resolve_markdown_route(href, ctx);
        return with_fragment(format!("#{slug}"), fragment);
    }

    if !href.is_empty() && ctx.assets_base.is_some() && !href.starts_with('#') && !href.starts_with('/')
    {
        let rewritten = match assets::resolve_asset_rel_path(href, ctx) {
            Some(resolved) => assets::to_asset_url(&resolved, ctx),
            None => href.to_string(),
        };
        return with_fragment(rewritten, fragment);
    }

    match (href.is_empty(), fragment) {
        (true, Some(fragment)) => match mode {
            HashShorthand::Route if fragment.starts_with('/') => format!("#{fragment}"),
            HashShorthand::Route => format!("#/{fragment}"),
            HashShorthand::Anchor => format!("#{}#{fragment}", ctx.current_slug),
        },
        _ if href.starts_with('#') => format!("#{}{href}", ctx.current_slug),
        _ if href.is_empty() => String::new(),
        _ => with_fragment(href.to_string(), fragment),
    }
}

fn with_fragment(mut href: String, fragment: Option<&str>) -> String {
    if let Some(fragment) = fragment {
        href.push('#');
        href.push_str(fragment);
    }
    href
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_md(rel: &str) -> String {
        format!("/{}", rel.trim_end_matches(".md"))
    }

    #[test]
    fn safe_url_allows_known_schemes() {
        assert_eq!(safe_url("http://a", UrlKind::Src), "http://a");
        assert_eq!(safe_url("HTTPS://A", UrlKind::Src), "HTTPS://A");
        assert_eq!(safe_url("mailto:me@example.com", UrlKind::Href), "mailto:me@example.com");
    }

    #[test]
    fn safe_url_rejects_other_schemes() {
        assert_eq!(safe_url("javascript:alert(1)", UrlKind::Href), "");
        assert_eq!(safe_url("JavaScript:alert(1)", UrlKind::Src), "");
        assert_eq!(safe_url("data:text/html;base64,xx", UrlKind::Src), "");
        assert_eq!(safe_url("vbscript:x", UrlKind::Href), "");
    }

    #[test]
    fn safe_url_trusts_internal_hrefs_only() {
        assert_eq!(safe_url("#top", UrlKind::Href), "#top");
        assert_eq!(safe_url("/abs", UrlKind::Href), "/abs");
        assert_eq!(safe_url("/x:y", UrlKind::Src), "");
    }

    #[test]
    fn safe_url_blank_is_empty() {
        assert_eq!(safe_url("   ", UrlKind::Href), "");
    }

    #[test]
    fn join_normalized_resolves_dots() {
        assert_eq!(join_normalized("a/b", "../c.md"), "a/c.md");
        assert_eq!(join_normalized(".", "x.md"), "x.md");
        assert_eq!(join_normalized("a", "../../x"), "../x");
        assert_eq!(join_normalized("a", ".."), ".");
    }

    #[test]
    fn dirname_variants() {
        assert_eq!(dirname("a/b/c.md"), "a/b");
        assert_eq!(dirname("c.md"), ".");
    }

    #[test]
    fn markdown_links_become_routes() {
        let ctx = CompileContext::new("a/b.md", "/a/b", &strip_md);
        assert_eq!(rewrite_href("./other.md", &ctx, HashShorthand::Anchor), "#/a/other");
        assert_eq!(rewrite_href("../top.MD", &ctx, HashShorthand::Anchor), "#/top.MD");
        assert_eq!(rewrite_href("/x.md", &ctx, HashShorthand::Anchor), "#/a/x");
    }

    #[test]
    fn app_routes_pass_through() {
        let ctx = CompileContext::new("a/b.md", "/a/b", &strip_md);
        assert_eq!(rewrite_href("#/guide#x", &ctx, HashShorthand::Anchor), "#/guide#x");
    }

    #[test]
    fn external_links_keep_fragment() {
        let ctx = CompileContext::new("a.md", "/a", &strip_md);
        assert_eq!(
            rewrite_href("https://example.com/p#frag", &ctx, HashShorthand::Anchor),
            "https://example.com/p#frag"
        );
    }

    #[test]
    fn rejected_scheme_becomes_empty() {
        let ctx = CompileContext::new("a.md", "/a", &strip_md);
        assert_eq!(rewrite_href("javascript:alert(1)", &ctx, HashShorthand::Anchor), "");
    }

    #[test]
    fn route_shorthand_keeps_leading_slash() {
        let ctx = CompileContext::new("a.md", "/a", &strip_md);
        assert_eq!(rewrite_href("#/already", &ctx, HashShorthand::Route), "#/already");
    }

    #[test]
    fn relative_asset_links_use_assets_base() {
        let ctx =
            CompileContext::new("guide/a.md", "/guide/a", &strip_md).with_assets_base(Some("/docs-assets"));
        assert_eq!(
            rewrite_href("files/spec.pdf?v=2#page=3", &ctx, HashShorthand::Anchor),
            "/docs-assets/guide/files/spec.pdf?v=2#page=3"
        );
    }

    #[test]
    fn escaping_asset_link_falls_through_unchanged() {
        let ctx = CompileContext::new("a.md", "/a", &strip_md).with_assets_base(Some("/docs-assets"));
        assert_eq!(
            rewrite_href("../../escape.txt", &ctx, HashShorthand::Anchor),
            "../../escape.txt"
        );
    }

    #[test]
    fn relative_links_without_assets_base_are_untouched() {
        let ctx = CompileContext::new("a.md", "/a", &strip_md);
        assert_eq!(rewrite_href("file.pdf", &ctx, HashShorthand::Anchor), "file.pdf");
    }
}
