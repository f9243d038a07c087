//! Manifest generation.
//!
//! The whole pipeline in one call:
//!
//! ```text
//! 1. Guard     assets dir must live outside the input dir
//! 2. Scan      docs/ → documents + assets + slug table
//! 3. Compile   every document, in parallel (rayon), then sort by slug
//! 4. Copy      assets → <assets dir>/<same relative path>
//! 5. Write     manifest JSON, via a temp file and a rename
//! ```
//!
//! Compilation is a pure function per document, so documents are compiled
//! on the rayon pool and merged afterwards in one deterministic sort. The
//! manifest is only written once every page compiled; a failure anywhere
//! leaves the previous manifest untouched.
//!
//! ## Output
//!
//! ```json
//! {
//!   "inputDir": "docs",
//!   "pages": [
//!     { "slug": "/", "title": "Home", "html": "<p>…</p>", "headings": [] },
//!     { "slug": "/guide/setup", "title": "Setup", "html": "…",
//!       "headings": [{ "depth": 2, "id": "install", "text": "Install" }] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::config::PagebakeConfig;
use crate::markdown::{self, CompileContext, CompileOptions};
use crate::scan::{self, InputTree, ScanError};
use crate::title::extract_title;
use crate::types::{CompiledPage, Manifest};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Assets directory must not be inside the input directory: {0}")]
    AssetsDirInsideInput(PathBuf),
    #[error("Slug {slug} is produced by both {first} and {second}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct GenerateSummary {
    pub manifest: Manifest,
    /// Number of files copied to the assets directory.
    pub asset_count: usize,
    pub manifest_path: PathBuf,
}

impl GenerateSummary {
    pub fn page_count(&self) -> usize {
        self.manifest.pages.len()
    }
}

/// Run the full pipeline for `input_dir` and write the manifest.
pub fn generate(input_dir: &Path, config: &PagebakeConfig) -> Result<GenerateSummary, GenerateError> {
    let abs_input = absolute(input_dir)?;
    let abs_manifest = absolute(Path::new(&config.output.manifest))?;
    let abs_assets = if config.assets.enabled {
        Some(absolute(Path::new(&config.assets.dir))?)
    } else {
        None
    };

    if let Some(assets_dir) = &abs_assets
        && assets_dir.starts_with(&abs_input)
    {
        return Err(GenerateError::AssetsDirInsideInput(assets_dir.clone()));
    }

    let (manifest, tree) = build_manifest(input_dir, config)?;
    let json = manifest_json(&manifest)?;

    let asset_count = match &abs_assets {
        Some(assets_dir) => copy_assets(&tree, assets_dir)?,
        None => 0,
    };

    write_atomic(&abs_manifest, &json)?;
    tracing::info!(
        pages = manifest.pages.len(),
        assets = asset_count,
        manifest = %abs_manifest.display(),
        "manifest written"
    );

    Ok(GenerateSummary {
        manifest,
        asset_count,
        manifest_path: abs_manifest,
    })
}

/// Scan and compile without touching the output locations.
///
/// Used by `generate` and by the `check` command.
pub fn build_manifest(
    input_dir: &Path,
    config: &PagebakeConfig,
) -> Result<(Manifest, InputTree), GenerateError> {
    let tree = scan::scan(input_dir, &config.scan)?;
    if let Some(collision) = tree.slugs.find_collision() {
        return Err(GenerateError::SlugCollision {
            slug: collision.slug,
            first: collision.first,
            second: collision.second,
        });
    }

    let pages = compile_tree(
        &tree,
        config.assets.effective_base(),
        &config.compile.options(),
    )?;

    let manifest = Manifest {
        input_dir: input_dir.to_string_lossy().into_owned(),
        pages,
    };
    Ok((manifest, tree))
}

/// Read and compile every document of `tree`, sorted by slug.
pub fn compile_tree(
    tree: &InputTree,
    assets_base: Option<&str>,
    options: &CompileOptions,
) -> Result<Vec<CompiledPage>, GenerateError> {
    let mut pages = tree
        .documents
        .par_iter()
        .map(|doc| -> Result<CompiledPage, GenerateError> {
            let source = read_lossy(&doc.abs_path)?;
            let ctx = CompileContext::new(&doc.rel_path, &doc.slug, &tree.slugs)
                .with_assets_base(assets_base);
            let compiled = markdown::compile_with(&source, &ctx, options);
            tracing::debug!(
                path = %doc.rel_path,
                slug = %doc.slug,
                headings = compiled.headings.len(),
                "compiled"
            );
            Ok(CompiledPage {
                slug: doc.slug.clone(),
                title: extract_title(&source, doc.file_name()),
                html: compiled.html,
                headings: compiled.headings,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    pages.sort_by(|a, b| a.slug.cmp(&b.slug));
    tracing::info!(pages = pages.len(), "compiled documents");
    Ok(pages)
}

/// Read a document, replacing invalid UTF-8 with U+FFFD instead of failing.
fn read_lossy(path: &Path) -> Result<String, GenerateError> {
    let bytes = fs::read(path).map_err(io_error(path))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), "invalid UTF-8, replacing bad bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

/// Pretty JSON with a trailing newline.
pub fn manifest_json(manifest: &Manifest) -> Result<String, GenerateError> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    Ok(json)
}

/// Copy every asset to `dest` at the same relative path. Returns the count.
fn copy_assets(tree: &InputTree, dest: &Path) -> Result<usize, GenerateError> {
    for asset in &tree.assets {
        let target = dest.join(&asset.rel_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::copy(&asset.abs_path, &target).map_err(|source| GenerateError::Copy {
            from: asset.abs_path.clone(),
            to: target.clone(),
            source,
        })?;
        tracing::debug!(from = %asset.rel_path, to = %target.display(), "copied asset");
    }
    Ok(tree.assets.len())
}

/// Write `contents` next to `path` first, then rename over it, so readers
/// never see a half-written manifest.
fn write_atomic(path: &Path, contents: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).map_err(io_error(&tmp))?;
    fs::rename(&tmp, path).map_err(io_error(path))
}

/// Absolute, lexically normalized form of `path` (no `.`/`..`), without
/// requiring it to exist.
fn absolute(path: &Path) -> Result<PathBuf, GenerateError> {
    let abs = std::path::absolute(path).map_err(io_error(path))?;
    let mut normalized = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_page, page_slugs, write_tree};
    use tempfile::TempDir;

    fn config_for(out: &Path) -> PagebakeConfig {
        let mut config = PagebakeConfig::default();
        config.output.manifest = out.join("docs.json").to_string_lossy().into_owned();
        config.assets.dir = out.join("assets").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn generates_sorted_manifest() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(
            docs.path(),
            &[
                ("zeta.md", "# Zeta"),
                ("index.md", "# Home\n\nWelcome"),
                ("Alpha.md", "# Alpha"),
                ("guide/index.md", "# Guide\n\n## Install"),
            ],
        );

        let summary = generate(docs.path(), &config_for(out.path())).unwrap();
        assert_eq!(
            page_slugs(&summary.manifest),
            vec!["/", "/Alpha", "/guide", "/zeta"]
        );
        assert_eq!(summary.page_count(), 4);

        let guide = find_page(&summary.manifest, "/guide");
        assert_eq!(guide.title, "Guide");
        assert_eq!(guide.headings[0].id, "install");
    }

    #[test]
    fn manifest_file_matches_summary() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("index.md", "# Home\n\nHi")]);

        let summary = generate(docs.path(), &config_for(out.path())).unwrap();
        let written = fs::read_to_string(&summary.manifest_path).unwrap();
        assert!(written.ends_with("}\n"));
        assert!(written.contains("\"inputDir\""));

        let parsed: Manifest = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, summary.manifest);
        assert!(!summary.manifest_path.with_extension("json.tmp").exists());
    }

    #[test]
    fn copies_assets_and_rewrites_urls() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(
            docs.path(),
            &[
                ("guide/page.md", "![logo](img/logo.png)"),
                ("guide/img/logo.png", "PNG"),
                ("pagebake.toml", ""),
            ],
        );

        let summary = generate(docs.path(), &config_for(out.path())).unwrap();
        assert_eq!(summary.asset_count, 1);
        assert_eq!(
            fs::read_to_string(out.path().join("assets/guide/img/logo.png")).unwrap(),
            "PNG"
        );
        let page = find_page(&summary.manifest, "/guide/page");
        assert!(page.html.contains(r#"src="/docs-assets/guide/img/logo.png""#));
    }

    #[test]
    fn failed_asset_copy_names_both_paths() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("a.md", "a"), ("x.png", "PNG")]);
        // A directory where the copied file should go.
        fs::create_dir_all(out.path().join("assets/x.png")).unwrap();

        match generate(docs.path(), &config_for(out.path())) {
            Err(GenerateError::Copy { from, to, .. }) => {
                assert_eq!(from, docs.path().join("x.png"));
                assert!(to.ends_with("assets/x.png"));
            }
            other => panic!("expected copy error, got {other:?}"),
        }
        assert!(!out.path().join("docs.json").exists());
    }

    #[test]
    fn disabled_assets_are_neither_copied_nor_rewritten() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("a.md", "![x](x.png)"), ("x.png", "PNG")]);

        let mut config = config_for(out.path());
        config.assets.enabled = false;
        let summary = generate(docs.path(), &config).unwrap();

        assert_eq!(summary.asset_count, 0);
        assert!(!out.path().join("assets").exists());
        assert!(find_page(&summary.manifest, "/a").html.contains(r#"src="x.png""#));
    }

    #[test]
    fn assets_dir_inside_input_is_rejected() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("a.md", "a")]);

        let mut config = config_for(out.path());
        config.assets.dir = docs.path().join("public").to_string_lossy().into_owned();
        let result = generate(docs.path(), &config);
        assert!(matches!(result, Err(GenerateError::AssetsDirInsideInput(_))));

        config.assets.dir = docs.path().to_string_lossy().into_owned();
        let result = generate(docs.path(), &config);
        assert!(matches!(result, Err(GenerateError::AssetsDirInsideInput(_))));
    }

    #[test]
    fn assets_dir_beside_input_is_fine() {
        let root = TempDir::new().unwrap();
        write_tree(root.path(), &[("docs/a.md", "a")]);

        let mut config = config_for(root.path());
        config.assets.dir = root.path().join("docs-assets").to_string_lossy().into_owned();
        assert!(generate(&root.path().join("docs"), &config).is_ok());
    }

    #[test]
    fn slug_collision_writes_nothing() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("foo.md", "a"), ("foo/index.md", "b")]);

        let config = config_for(out.path());
        let result = generate(docs.path(), &config);
        match result {
            Err(GenerateError::SlugCollision { slug, first, second }) => {
                assert_eq!(slug, "/foo");
                assert_eq!(first, "foo.md");
                assert_eq!(second, "foo/index.md");
            }
            other => panic!("expected slug collision, got {other:?}"),
        }
        assert!(!out.path().join("docs.json").exists());
    }

    #[test]
    fn failed_run_keeps_previous_manifest() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("index.md", "# One")]);
        let config = config_for(out.path());
        generate(docs.path(), &config).unwrap();
        let before = fs::read_to_string(out.path().join("docs.json")).unwrap();

        write_tree(
            docs.path(),
            &[("index.md", "# Two"), ("dup.md", "x"), ("dup/index.md", "y")],
        );
        assert!(generate(docs.path(), &config).is_err());

        let after = fs::read_to_string(out.path().join("docs.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn missing_input_is_a_scan_error() {
        let out = TempDir::new().unwrap();
        let result = generate(&out.path().join("missing"), &config_for(out.path()));
        assert!(matches!(result, Err(GenerateError::Scan(_))));
    }

    #[test]
    fn build_manifest_does_not_write() {
        let docs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_tree(docs.path(), &[("a.md", "# A"), ("x.png", "PNG")]);

        let (manifest, tree) = build_manifest(docs.path(), &config_for(out.path())).unwrap();
        assert_eq!(page_slugs(&manifest), vec!["/a"]);
        assert_eq!(tree.assets.len(), 1);
        assert!(fs::read_dir(out.path()).unwrap().next().is_none());
    }

    #[test]
    fn absolute_normalizes_dot_segments() {
        let abs = absolute(Path::new("/a/b/../c/./d")).unwrap();
        assert_eq!(abs, PathBuf::from("/a/c/d"));
    }
}
