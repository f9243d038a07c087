//! End-to-end tests: a docs folder on disk in, a manifest file out.

use std::fs;
use std::path::Path;

use pagebake::config::{self, PagebakeConfig};
use pagebake::generate::{self, GenerateError};
use pagebake::types::{CompiledPage, Manifest};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// A workspace with `docs/` as input and outputs next to it.
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new(files: &[(&str, &str)]) -> Self {
        let root = TempDir::new().unwrap();
        write_tree(&root.path().join("docs"), files);
        Self { root }
    }

    fn docs(&self) -> std::path::PathBuf {
        self.root.path().join("docs")
    }

    fn manifest_path(&self) -> std::path::PathBuf {
        self.root.path().join("out/docs.json")
    }

    fn config(&self) -> PagebakeConfig {
        let mut config = config::load_config(&self.docs()).unwrap();
        config.output.manifest = self.manifest_path().to_string_lossy().into_owned();
        config.assets.dir = self
            .root
            .path()
            .join("public/docs-assets")
            .to_string_lossy()
            .into_owned();
        config
    }

    fn generate(&self) -> Result<Manifest, GenerateError> {
        generate::generate(&self.docs(), &self.config()).map(|s| s.manifest)
    }
}

fn page<'a>(manifest: &'a Manifest, slug: &str) -> &'a CompiledPage {
    manifest
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| panic!("page '{slug}' not found"))
}

// =============================================================================
// Compilation through the pipeline
// =============================================================================

#[test]
fn relative_markdown_link_becomes_route_and_title_is_suppressed() {
    let ws = Workspace::new(&[
        ("a/b.md", "# Title\n\nHello [World](./other.md#section)"),
        ("a/other.md", "## Section"),
    ]);
    let manifest = ws.generate().unwrap();

    let b = page(&manifest, "/a/b");
    assert_eq!(b.title, "Title");
    assert!(b.html.contains(r##"<a href="#/a/other#section">World</a>"##));
    assert!(!b.html.contains("<h1"));

    let other = page(&manifest, "/a/other");
    assert_eq!(other.title, "Other");
    assert_eq!(other.headings[0].id, "section");
}

#[test]
fn table_alignment() {
    let ws = Workspace::new(&[("t.md", "| A | B |\n|---|---:|\n| 1 | 2 |")]);
    let manifest = ws.generate().unwrap();

    assert_eq!(
        page(&manifest, "/t").html,
        "<table><thead><tr><th>A</th><th style=\"text-align: right\">B</th></tr></thead>\
         <tbody><tr><td>1</td><td style=\"text-align: right\">2</td></tr></tbody></table>"
    );
}

#[test]
fn unsafe_schemes_are_emptied() {
    let ws = Workspace::new(&[(
        "x.md",
        "[a](javascript:alert(1)) ![b](data:image/png;base64,xx)\n\n<script>alert(1)</script>",
    )]);
    let manifest = ws.generate().unwrap();
    let html = &page(&manifest, "/x").html;

    assert!(html.contains(r#"<a href="">a</a>"#));
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("data:"));
    assert!(!html.contains("<script"));
}

#[test]
fn repeated_headings_get_numbered_ids() {
    let ws = Workspace::new(&[("s.md", "## Setup\n\n## Setup\n\n## Setup")]);
    let manifest = ws.generate().unwrap();
    let ids: Vec<_> = page(&manifest, "/s")
        .headings
        .iter()
        .map(|h| h.id.as_str())
        .collect();
    assert_eq!(ids, vec!["setup", "setup-2", "setup-3"]);
}

#[test]
fn asset_reference_cannot_escape_the_input_root() {
    let ws = Workspace::new(&[
        ("guide/page.md", "[out](../../escape.txt) [in](../notes.txt)"),
        ("notes.txt", "notes"),
    ]);
    let manifest = ws.generate().unwrap();
    let html = &page(&manifest, "/guide/page").html;

    assert!(html.contains(r#"href="../../escape.txt""#));
    assert!(html.contains(r#"href="/docs-assets/notes.txt""#));
    assert!(!html.contains("docs-assets/escape.txt"));
}

#[test]
fn invalid_utf8_is_replaced_not_fatal() {
    let ws = Workspace::new(&[("good.md", "# Good")]);
    fs::write(ws.docs().join("bad.md"), b"# Caf\xe9\n\nna\xefve").unwrap();

    let manifest = ws.generate().unwrap();
    assert_eq!(manifest.pages.len(), 2);

    let bad = page(&manifest, "/bad");
    assert_eq!(bad.title, "Caf\u{FFFD}");
    assert_eq!(bad.html, "<p>na\u{FFFD}ve</p>");
    assert!(ws.manifest_path().exists());
}

#[test]
fn summary_reports_absolute_manifest_path() {
    let ws = Workspace::new(&[("a.md", "a")]);
    let summary = generate::generate(&ws.docs(), &ws.config()).unwrap();
    assert!(summary.manifest_path.is_absolute());
    assert_eq!(summary.manifest_path, ws.manifest_path());
}

// =============================================================================
// Routing
// =============================================================================

#[test]
fn index_and_readme_routes() {
    let ws = Workspace::new(&[
        ("index.md", "# Home"),
        ("guide/README.md", "# Guide"),
        ("api/index.md", "# API"),
        ("api/README.md", "# API readme"),
        ("api/auth.md", "See [home](../index.md) and [guide](../guide/README.md)"),
    ]);
    let manifest = ws.generate().unwrap();

    let slugs: Vec<_> = manifest.pages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["/", "/api", "/api/auth", "/api/readme", "/guide"]);

    let auth = &page(&manifest, "/api/auth").html;
    assert!(auth.contains(r##"href="#/""##));
    assert!(auth.contains(r##"href="#/guide""##));
}

#[test]
fn hidden_and_skipped_folders_are_ignored() {
    let ws = Workspace::new(&[
        ("a.md", "a"),
        (".drafts/wip.md", "wip"),
        ("node_modules/pkg/README.md", "pkg"),
        ("img/.DS_Store", "junk"),
    ]);
    let manifest = ws.generate().unwrap();
    assert_eq!(manifest.pages.len(), 1);
    assert!(!ws.root.path().join("public/docs-assets/img/.DS_Store").exists());
}

#[test]
fn index_and_sibling_file_collide() {
    let ws = Workspace::new(&[("foo.md", "a"), ("foo/index.md", "b")]);
    let err = ws.generate().unwrap_err();

    assert!(matches!(err, GenerateError::SlugCollision { ref slug, .. } if slug == "/foo"));
    assert!(!ws.manifest_path().exists());
}

// =============================================================================
// Output files
// =============================================================================

#[test]
fn manifest_file_shape() {
    let ws = Workspace::new(&[("index.md", "# Home\n\n## Intro")]);
    ws.generate().unwrap();

    let text = fs::read_to_string(ws.manifest_path()).unwrap();
    assert!(text.ends_with("}\n"));

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["inputDir"], ws.docs().to_string_lossy().as_ref());
    let first = &value["pages"][0];
    assert_eq!(first["slug"], "/");
    assert_eq!(first["title"], "Home");
    assert_eq!(first["html"], r#"<h2 id="intro">Intro</h2>"#);
    assert_eq!(first["headings"][0]["depth"], 2);
}

#[test]
fn assets_are_copied_with_their_relative_paths() {
    let ws = Workspace::new(&[
        ("guide/setup.md", "![diagram](img/flow.svg)"),
        ("guide/img/flow.svg", "<svg/>"),
        ("pagebake.toml", "[compile]\nmax_quote_depth = 4\n"),
    ]);
    let manifest = ws.generate().unwrap();

    let copied = ws.root.path().join("public/docs-assets/guide/img/flow.svg");
    assert_eq!(fs::read_to_string(copied).unwrap(), "<svg/>");
    assert!(!ws.root.path().join("public/docs-assets/pagebake.toml").exists());
    assert!(
        page(&manifest, "/guide/setup")
            .html
            .contains(r#"<img src="/docs-assets/guide/img/flow.svg" alt="diagram" loading="lazy" />"#)
    );
}

#[test]
fn config_file_in_input_sets_asset_base() {
    let ws = Workspace::new(&[
        ("p.md", "![x](x.png)"),
        ("x.png", "PNG"),
        ("pagebake.toml", "[assets]\nbase = \"static/\"\n"),
    ]);
    let manifest = ws.generate().unwrap();
    assert!(page(&manifest, "/p").html.contains(r#"src="static/x.png""#));
}

#[test]
fn unknown_config_key_is_rejected() {
    let ws = Workspace::new(&[("pagebake.toml", "[assets]\nbogus = 1\n")]);
    assert!(config::load_config(&ws.docs()).is_err());
}

#[test]
fn assets_dir_inside_input_is_fatal() {
    let ws = Workspace::new(&[("a.md", "a")]);
    let mut config = ws.config();
    config.assets.dir = ws.docs().join("public").to_string_lossy().into_owned();

    let err = generate::generate(&ws.docs(), &config).unwrap_err();
    assert!(matches!(err, GenerateError::AssetsDirInsideInput(_)));
    assert!(!ws.manifest_path().exists());
}

#[test]
fn regenerating_is_byte_identical() {
    let ws = Workspace::new(&[
        ("index.md", "# Home\n\n> quote\n> > nested\n\n- a\n- b"),
        ("z/deep.md", "```rust\nfn main() {}\n```"),
    ]);
    ws.generate().unwrap();
    let first = fs::read(ws.manifest_path()).unwrap();
    ws.generate().unwrap();
    assert_eq!(fs::read(ws.manifest_path()).unwrap(), first);
}
