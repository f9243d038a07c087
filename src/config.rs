//! Pipeline configuration.
//!
//! Handles loading, validating and overriding `pagebake.toml`. The file is
//! optional and lives in the input directory root; it is never copied as an
//! asset. Stock defaults are the base layer, the file is merged on top, and
//! command-line flags win over both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! manifest = "src/generated/docs.json"   # Manifest path (relative to the CWD)
//!
//! [assets]
//! enabled = true                         # Copy non-Markdown files, rewrite URLs
//! dir = "public/docs-assets"             # Copy destination (relative to the CWD)
//! base = "/docs-assets"                  # URL prefix written into the HTML
//!
//! [scan]
//! skip_dirs = ["node_modules", ".git", "dist", ".vite", "target"]
//! folder_index_case = "exact"            # "exact" | "ignore-case"
//!
//! [compile]
//! max_quote_depth = 16                   # Blockquote nesting limit (1-256)
//!
//! [processing]
//! max_threads = 4                        # Compile workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, override just the values you want:
//!
//! ```toml
//! [assets]
//! base = "docs-assets"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::markdown::CompileOptions;
use crate::naming::FolderIndexCase;

/// Name of the config file looked up in the input directory root.
pub const CONFIG_FILE_NAME: &str = "pagebake.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pagebake.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagebakeConfig {
    /// Where the manifest is written.
    pub output: OutputConfig,
    /// Asset copying and URL rewriting.
    pub assets: AssetsConfig,
    /// Input enumeration rules.
    pub scan: ScanConfig,
    /// Markdown compiler limits.
    pub compile: CompileConfig,
    /// Parallel compile settings.
    pub processing: ProcessingConfig,
}

impl PagebakeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.manifest.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.manifest must not be empty".into(),
            ));
        }
        if !(1..=256).contains(&self.compile.max_quote_depth) {
            return Err(ConfigError::Validation(
                "compile.max_quote_depth must be 1-256".into(),
            ));
        }
        if self.assets.enabled {
            if self.assets.dir.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "assets.dir must not be empty when assets are enabled".into(),
                ));
            }
            if self.assets.base.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "assets.base must not be empty when assets are enabled".into(),
                ));
            }
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides, then re-validate.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(manifest) = &overrides.out_file {
            self.output.manifest = manifest.to_string_lossy().into_owned();
        }
        if let Some(dir) = &overrides.assets_dir {
            self.assets.dir = dir.to_string_lossy().into_owned();
        }
        if let Some(base) = &overrides.assets_base {
            self.assets.base = base.clone();
        }
        if overrides.no_assets {
            self.assets.enabled = false;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Values given on the command line, which win over `pagebake.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub out_file: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub assets_base: Option<String>,
    pub no_assets: bool,
}

/// Manifest output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Manifest path, relative to the working directory.
    pub manifest: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            manifest: "src/generated/docs.json".to_string(),
        }
    }
}

/// Asset copy and rewrite settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// When false, no files are copied and relative URLs are left alone.
    pub enabled: bool,
    /// Copy destination, relative to the working directory.
    pub dir: String,
    /// URL prefix for copied files, absolute (`/docs-assets`) or relative.
    pub base: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "public/docs-assets".to_string(),
            base: "/docs-assets".to_string(),
        }
    }
}

impl AssetsConfig {
    /// The base URL handed to the compiler, `None` when assets are off.
    pub fn effective_base(&self) -> Option<&str> {
        if self.enabled {
            crate::markdown::assets::normalize_assets_base(Some(&self.base))
        } else {
            None
        }
    }
}

/// Input enumeration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory names skipped anywhere in the tree. Dot-prefixed entries
    /// are always skipped.
    pub skip_dirs: Vec<String>,
    /// How `index`/`README` file names are matched.
    pub folder_index_case: FolderIndexCase,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_dirs: ["node_modules", ".git", "dist", ".vite", "target"]
                .map(String::from)
                .to_vec(),
            folder_index_case: FolderIndexCase::Exact,
        }
    }
}

impl ScanConfig {
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|skip| skip == name)
    }
}

/// Markdown compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Deepest blockquote nesting compiled recursively.
    pub max_quote_depth: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            max_quote_depth: CompileOptions::default().max_quote_depth,
        }
    }
}

impl CompileConfig {
    pub fn options(&self) -> CompileOptions {
        CompileOptions {
            max_quote_depth: self.max_quote_depth,
        }
    }
}

/// Parallel compile settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of compile workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Worker threads for the compile pool: all cores unless `max_threads`
/// asks for fewer.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// [`PagebakeConfig::default`] as a TOML table, the bottom layer that a
/// `pagebake.toml` is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PagebakeConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` onto `base`.
///
/// Tables merge per key; any other overlay value (arrays included) replaces
/// the base value outright. Base keys missing from the overlay survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `pagebake.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Layer `overlay` (if any) onto `base`, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PagebakeConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PagebakeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `pagebake.toml` in the given input directory.
///
/// A missing file means stock defaults. Unknown keys are an error.
pub fn load_config(input_dir: &Path) -> Result<PagebakeConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(input_dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `pagebake.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pagebake configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the docs folder as pagebake.toml.
# Command-line flags (--out-file, --assets-dir, --assets-base, --no-assets)
# override the values here. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Manifest output
# ---------------------------------------------------------------------------
[output]
# Where the page manifest (JSON) is written, relative to the working directory.
manifest = "src/generated/docs.json"

# ---------------------------------------------------------------------------
# Assets
# ---------------------------------------------------------------------------
[assets]
# Copy every non-Markdown file to `dir` and rewrite relative links and
# images in the HTML to point under `base`.
enabled = true

# Copy destination, relative to the working directory.
# Must not be inside the docs folder.
dir = "public/docs-assets"

# URL prefix for copied files. Absolute ("/docs-assets") or relative
# ("docs-assets", useful when the site is served from a sub-path).
base = "/docs-assets"

# ---------------------------------------------------------------------------
# Scanning
# ---------------------------------------------------------------------------
[scan]
# Directory names skipped anywhere in the tree. Dot-prefixed files and
# directories are always skipped.
skip_dirs = ["node_modules", ".git", "dist", ".vite", "target"]

# How index.md / README.md are recognized as folder pages.
#   "exact"       - only `index` and `README`
#   "ignore-case" - any casing (Index.md, readme.md, ...)
folder_index_case = "exact"

# ---------------------------------------------------------------------------
# Compiler
# ---------------------------------------------------------------------------
[compile]
# Deepest blockquote nesting compiled as nested blocks (1-256). Deeper
# quotes are flattened into a single paragraph.
max_quote_depth = 16

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compile workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
