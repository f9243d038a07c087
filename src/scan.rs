//! Input enumeration.
//!
//! Walks the docs folder and sorts every file into one of two buckets:
//!
//! ```text
//! docs/
//! ├── pagebake.toml            # Config (optional, never an asset)
//! ├── index.md                 # Document → /
//! ├── guide/
//! │   ├── README.md            # Document → /guide (no index.md here)
//! │   ├── setup.md             # Document → /guide/setup
//! │   └── img/logo.png         # Asset → <assets dir>/guide/img/logo.png
//! ├── .drafts/                 # Skipped (dot-prefixed)
//! └── node_modules/            # Skipped (scan.skip_dirs)
//! ```
//!
//! Documents are `*.md` files (any case); everything else is an asset.
//! Symlinks are not followed.
//! Entries are visited in file-name order so results are deterministic.
//!
//! The [`SlugTable`] built here is the read-only view every compile call
//! uses to turn `.md` links into routes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::config::{CONFIG_FILE_NAME, ScanConfig};
use crate::markdown::SlugResolver;
use crate::naming::{self, FolderIndexCase};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory not found: {0}")]
    MissingInput(PathBuf),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
}

/// A Markdown file found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// POSIX path relative to the input root, extension included.
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub slug: String,
}

impl Document {
    pub fn file_name(&self) -> &str {
        naming::split_dir(&self.rel_path).1
    }
}

/// A non-Markdown file found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// POSIX path relative to the input root.
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// Everything found under the input root.
#[derive(Debug)]
pub struct InputTree {
    pub root: PathBuf,
    /// In walk order (file-name order per directory).
    pub documents: Vec<Document>,
    pub assets: Vec<Asset>,
    pub slugs: SlugTable,
}

/// Two documents that derive the same route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: String,
    pub first: String,
    pub second: String,
}

/// Route lookup over the whole document set.
///
/// Known documents map to the slug derived at scan time. Paths that are not
/// documents (dangling links) get a slug from the same rule, using what is
/// known about their folder.
#[derive(Debug, Clone, Default)]
pub struct SlugTable {
    by_path: BTreeMap<String, String>,
    folders_with_index: HashSet<String>,
    case: FolderIndexCase,
}

impl SlugTable {
    /// Build the table from document paths relative to the input root.
    pub fn new<'a>(rel_paths: impl IntoIterator<Item = &'a str>, case: FolderIndexCase) -> Self {
        let rel_paths: Vec<String> = rel_paths.into_iter().map(naming::to_posix).collect();

        let folders_with_index = rel_paths
            .iter()
            .filter_map(|path| {
                let (dir, file) = naming::split_dir(path);
                case.is_index(naming::strip_md_extension(file))
                    .then(|| dir.to_string())
            })
            .collect();

        let mut table = Self {
            by_path: BTreeMap::new(),
            folders_with_index,
            case,
        };
        for path in rel_paths {
            let slug = table.derive(&path);
            table.by_path.insert(path, slug);
        }
        table
    }

    fn derive(&self, rel_path: &str) -> String {
        let (dir, _) = naming::split_dir(rel_path);
        naming::derive_slug(rel_path, self.folders_with_index.contains(dir), self.case)
    }

    /// Route for `rel_path`, known or not.
    pub fn slug_for(&self, rel_path: &str) -> String {
        let posix = naming::to_posix(rel_path);
        match self.by_path.get(&posix) {
            Some(slug) => slug.clone(),
            None => self.derive(&posix),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// First pair of documents (in path order) that share a route.
    pub fn find_collision(&self) -> Option<SlugCollision> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (path, slug) in &self.by_path {
            if let Some(first) = owners.insert(slug, path) {
                return Some(SlugCollision {
                    slug: slug.clone(),
                    first: first.to_string(),
                    second: path.clone(),
                });
            }
        }
        None
    }
}

impl SlugResolver for SlugTable {
    fn resolve(&self, rel_path: &str) -> String {
        self.slug_for(rel_path)
    }
}

/// Whether a walk entry is pruned: dot-prefixed names anywhere, and
/// configured directory names. The root itself is never pruned.
fn is_ignored(entry: &DirEntry, config: &ScanConfig) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && config.is_skipped_dir(&name))
}

fn is_markdown(name: &str) -> bool {
    name.len() > 3 && naming::strip_md_extension(name).len() == name.len() - 3
}

fn rel_posix(root: &Path, path: &Path) -> Result<String, ScanError> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel
        .to_str()
        .ok_or_else(|| ScanError::NonUtf8Path(path.to_path_buf()))?;
    Ok(naming::to_posix(rel))
}

/// Enumerate documents and assets under `root`.
pub fn scan(root: &Path, config: &ScanConfig) -> Result<InputTree, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingInput(root.to_path_buf()));
    }

    let mut documents = Vec::new();
    let mut assets = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let ignored = is_ignored(entry, config);
            if ignored {
                tracing::debug!(path = %entry.path().display(), "skipping");
            }
            !ignored
        });

    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = rel_posix(root, entry.path())?;
        if rel_path == CONFIG_FILE_NAME {
            continue;
        }

        let abs_path = entry.into_path();
        if is_markdown(&rel_path) {
            documents.push((rel_path, abs_path));
        } else {
            assets.push(Asset { rel_path, abs_path });
        }
    }

    let slugs = SlugTable::new(
        documents.iter().map(|(rel, _)| rel.as_str()),
        config.folder_index_case,
    );
    let documents: Vec<Document> = documents
        .into_iter()
        .map(|(rel_path, abs_path)| Document {
            slug: slugs.slug_for(&rel_path),
            rel_path,
            abs_path,
        })
        .collect();

    tracing::info!(
        root = %root.display(),
        documents = documents.len(),
        assets = assets.len(),
        "scanned input"
    );

    Ok(InputTree {
        root: root.to_path_buf(),
        documents,
        assets,
        slugs,
    })
}
