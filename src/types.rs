//! Types serialized into the page manifest.
//!
//! The manifest is the only contract with the viewer, so field names here
//! are the JSON field names it reads.

use serde::{Deserialize, Serialize};

/// One entry of a page's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingEntry {
    /// Heading level, 2 through 6.
    pub depth: u8,
    /// Element id, unique within the page.
    pub id: String,
    /// Plain heading text.
    pub text: String,
}

/// A compiled document, ready for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPage {
    /// Route, e.g. `/guide/setup`; `/` for the root index.
    pub slug: String,
    pub title: String,
    /// Sanitized HTML fragment.
    pub html: String,
    pub headings: Vec<HeadingEntry>,
}

/// The generated `docs.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Input directory as given on the command line or in config.
    pub input_dir: String,
    /// Sorted by `slug`, byte-wise.
    pub pages: Vec<CompiledPage>,
}
