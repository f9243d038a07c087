//! # pagebake
//!
//! Build-time Markdown → HTML page manifest generator for single-page docs
//! viewers. A folder of Markdown files goes in; one JSON file comes out,
//! holding every page's route, title, sanitized HTML fragment, and heading
//! outline. Non-Markdown files are copied alongside so relative images and
//! downloads keep working.
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      docs/       →  documents, assets, slug table
//! 2. Compile   each .md    →  CompiledPage            (parallel, pure)
//! 3. Assemble  pages       →  Manifest, sorted by slug
//! 4. Write     assets      →  public/docs-assets/
//!              manifest    →  src/generated/docs.json
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the docs folder, separates documents from assets, builds the slug table |
//! | [`markdown`] | The compiler: Markdown subset → sanitized HTML + heading list |
//! | [`title`] | Page title resolution (frontmatter, `<h1>`, `# heading`, file name) |
//! | [`generate`] | Runs the pipeline and writes the manifest |
//! | [`watch`] | Rebuild-on-change loop for local development |
//! | [`config`] | `pagebake.toml` loading, merging over stock defaults, validation |
//! | [`types`] | The serialized manifest types |
//! | [`naming`] | File path → route rules, including the `index`/`README` convention |
//! | [`text`] | Escaping, slugify, whitespace and inline-stripping helpers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Escape Everything, Allow a Little
//!
//! The compiler never passes author HTML through. Every character of input
//! is either consumed by a recognized construct or escaped. A short list of
//! tags (`<br>`, `<img>`, `<a>`, `<span>` and `h1`–`h6`/`p` blocks) is
//! re-emitted from parsed attributes, and every URL goes through the same
//! scheme allow-list. The output is safe to inject with `innerHTML`.
//!
//! ## Pure Compile Step
//!
//! [`markdown::compile`] is a function of the document text and a
//! read-only [`markdown::CompileContext`]. Nothing is shared between calls,
//! which is why [`generate`] can fan documents out over rayon and only sort
//! once at the end. The same input always produces the same bytes.
//!
//! ## Routes Come From the Filesystem
//!
//! `guide/setup.md` is served at `/guide/setup`; `guide/index.md` (or
//! `guide/README.md` when there is no index) at `/guide`. Links between
//! documents are written as relative `.md` paths and rewritten to routes at
//! build time, so they work both on GitHub and in the viewer.

pub mod config;
pub mod generate;
pub mod markdown;
pub mod naming;
pub mod output;
pub mod scan;
pub mod text;
pub mod title;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
