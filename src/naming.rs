//! Route (slug) derivation from document paths.
//!
//! Every Markdown file maps to one root-rooted route. The rule is purely
//! path-based:
//!
//! - `.md` is dropped: `guide/setup.md` → `/guide/setup`
//! - `index` collapses to its folder: `guide/index.md` → `/guide`, `index.md` → `/`
//! - `README` collapses the same way, but only when the folder has no `index`
//! - a `README` shadowed by an `index` keeps a lower-cased route: `/guide/readme`
//!
//! Whether `Index.md` or `readme.md` count as folder indexes is decided by
//! [`FolderIndexCase`]. Titles derived from file names use [`humanize_file_name`].

use serde::{Deserialize, Serialize};

/// How the `index`/`README` file names are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FolderIndexCase {
    /// Only `index` and `README`, exactly.
    #[default]
    Exact,
    /// Any casing of either name.
    IgnoreCase,
}

impl FolderIndexCase {
    pub fn is_index(self, stem: &str) -> bool {
        match self {
            Self::Exact => stem == "index",
            Self::IgnoreCase => stem.eq_ignore_ascii_case("index"),
        }
    }

    pub fn is_readme(self, stem: &str) -> bool {
        match self {
            Self::Exact => stem == "README",
            Self::IgnoreCase => stem.eq_ignore_ascii_case("readme"),
        }
    }
}

/// Convert backslash separators to forward slashes.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Strip a trailing `.md` (any case).
pub fn strip_md_extension(path: &str) -> &str {
    let len = path.len();
    if len >= 3 && path.is_char_boundary(len - 3) && path[len - 3..].eq_ignore_ascii_case(".md") {
        &path[..len - 3]
    } else {
        path
    }
}

/// Split a POSIX path into `(directory, file name)`; the directory is `""` at the root.
pub fn split_dir(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}

/// Derive the route for a document at `rel_path` (relative to the input root).
///
/// `folder_has_index` tells whether the document's folder also contains an
/// `index` document; it only matters for `README` files.
///
/// ```
/// use pagebake::naming::{FolderIndexCase, derive_slug};
///
/// let case = FolderIndexCase::Exact;
/// assert_eq!(derive_slug("index.md", false, case), "/");
/// assert_eq!(derive_slug("guide/setup.md", false, case), "/guide/setup");
/// assert_eq!(derive_slug("guide/README.md", false, case), "/guide");
/// assert_eq!(derive_slug("guide/README.md", true, case), "/guide/readme");
/// ```
pub fn derive_slug(rel_path: &str, folder_has_index: bool, case: FolderIndexCase) -> String {
    let posix = to_posix(rel_path);
    let without_ext = strip_md_extension(posix.trim_start_matches('/'));
    let (dir, stem) = split_dir(without_ext);

    let route = if case.is_index(stem) || (case.is_readme(stem) && !folder_has_index) {
        dir.to_string()
    } else if case.is_readme(stem) {
        join_route(dir, &stem.to_lowercase())
    } else {
        without_ext.to_string()
    };

    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn join_route(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Turn a file name into a display title.
///
/// The `.md` extension is dropped, runs of `-`/`_` become a single space and
/// the first character is upper-cased:
/// - `getting-started.md` → "Getting started"
/// - `api__reference.md` → "Api reference"
pub fn humanize_file_name(file_name: &str) -> String {
    let base = strip_md_extension(file_name);

    let mut spaced = String::with_capacity(base.len());
    let mut in_separator = false;
    for c in base.chars() {
        if c == '-' || c == '_' {
            if !in_separator {
                spaced.push(' ');
            }
            in_separator = true;
        } else {
            spaced.push(c);
            in_separator = false;
        }
    }

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => base.to_string(),
    }
}
