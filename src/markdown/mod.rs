//! Safe Markdown → HTML compiler.
//!
//! A deliberately small, hand-rolled compiler for the docs subset the viewer
//! needs. It is a pure function of `(text, context)`: no shared state, no I/O,
//! so documents can be compiled in any order and on any thread.
//!
//! # Safety model
//!
//! Output HTML only ever contains tags the compiler emits itself. Every piece
//! of source text reaches the output escaped, and the inline parser falls
//! back to escaping one character at a time whenever nothing else matches, so
//! unknown or malformed markup degrades to visible text instead of leaking.
//! URLs pass through [`urls::safe_url`] (scheme allow-list) before anything
//! else looks at them.
//!
//! # Cross-document links and assets
//!
//! Links to `*.md` files are resolved relative to the compiling document and
//! mapped through the [`SlugResolver`] into hash routes (`#/guide/setup`).
//! When an assets base is configured, other relative references are rewritten
//! under it (`/docs-assets/guide/img/logo.png`), refusing any path that would
//! escape the input root.
//!
//! # Example
//!
//! ```
//! use pagebake::markdown::{CompileContext, compile};
//!
//! let resolver = |rel: &str| format!("/{}", rel.trim_end_matches(".md"));
//! let ctx = CompileContext::new("a/b.md", "/a/b", &resolver);
//!
//! let doc = compile("# Title\n\nHello [World](./other.md#section)", &ctx);
//! assert!(doc.html.contains(r##"<a href="#/a/other#section">World</a>"##));
//! assert!(!doc.html.contains("<h1"));
//! ```

pub mod assets;
mod blocks;
mod headings;
mod html;
mod inline;
mod tables;
pub mod urls;

pub use crate::types::HeadingEntry;
pub use headings::HeadingIdAllocator;

use crate::text;

/// Maps a document path (relative to the input root, `.md` included) to its route.
///
/// Implemented for any `Fn(&str) -> String`, so tests can pass a closure while
/// the pipeline passes its slug table.
pub trait SlugResolver: Sync {
    fn resolve(&self, rel_path: &str) -> String;
}

impl<F> SlugResolver for F
where
    F: Fn(&str) -> String + Sync,
{
    fn resolve(&self, rel_path: &str) -> String {
        self(rel_path)
    }
}

/// Everything one compile call needs to resolve relative references.
///
/// Immutable for the duration of a call. Nested blockquotes get their own
/// copy rather than sharing the parent's.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    /// Path of the document being compiled, relative to the input root.
    pub current_rel_path: &'a str,
    /// Route of the document being compiled.
    pub current_slug: &'a str,
    /// Read-only view over the whole document set.
    pub slugs: &'a dyn SlugResolver,
    /// URL prefix for copied assets; `None` disables asset rewriting.
    pub assets_base: Option<&'a str>,
}

impl<'a> CompileContext<'a> {
    pub fn new(current_rel_path: &'a str, current_slug: &'a str, slugs: &'a dyn SlugResolver) -> Self {
        Self {
            current_rel_path,
            current_slug,
            slugs,
            assets_base: None,
        }
    }

    /// Enable asset rewriting under `base` (normalized; blank disables it).
    pub fn with_assets_base(mut self, base: Option<&'a str>) -> Self {
        self.assets_base = assets::normalize_assets_base(base);
        self
    }
}

/// Tuning knobs that are not part of the per-document context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Maximum blockquote nesting compiled recursively.
    pub max_quote_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { max_quote_depth: 16 }
    }
}

/// Result of compiling one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDocument {
    /// Injection-safe HTML fragment.
    pub html: String,
    /// Headings of depth ≥ 2, in document order.
    pub headings: Vec<HeadingEntry>,
}

/// Compile a document with default [`CompileOptions`].
pub fn compile(markdown: &str, ctx: &CompileContext<'_>) -> CompiledDocument {
    compile_with(markdown, ctx, &CompileOptions::default())
}

/// Compile a top-level document.
///
/// Normalizes line endings, strips leading frontmatter and suppresses the
/// first level-1 heading (it is the page title, rendered by the viewer).
pub fn compile_with(
    markdown: &str,
    ctx: &CompileContext<'_>,
    options: &CompileOptions,
) -> CompiledDocument {
    let ctx = CompileContext {
        assets_base: assets::normalize_assets_base(ctx.assets_base),
        ..*ctx
    };
    let normalized = text::normalize_newlines(markdown);
    let body = text::strip_frontmatter(&normalized);
    blocks::compile_blocks(body, &ctx, options, blocks::Nesting::TOP)
}
