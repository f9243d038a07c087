//! Shared test utilities.
//!
//! Builds small docs trees in temp directories and looks pages up in a
//! generated manifest with panics that say what was there instead.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_tree(tmp.path(), &[("index.md", "# Home"), ("guide/setup.md", "## Step")]);
//!
//! let page = find_page(&manifest, "/guide/setup");
//! assert_eq!(page.headings[0].id, "step");
//! ```

use std::fs;
use std::path::Path;

use crate::types::{CompiledPage, Manifest};

/// Write `(relative path, contents)` pairs under `root`, creating folders.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
    }
}

/// Find a page by slug. Panics with the available slugs if not found.
pub fn find_page<'a>(manifest: &'a Manifest, slug: &str) -> &'a CompiledPage {
    manifest
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            panic!(
                "page '{}' not found. Available: {:?}",
                slug,
                page_slugs(manifest)
            )
        })
}

/// All page slugs, in manifest order.
pub fn page_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.pages.iter().map(|p| p.slug.as_str()).collect()
}
