//! Asset reference resolution.
//!
//! Relative references in a document are resolved against that document's
//! folder, kept inside the input root and re-based under the configured
//! assets URL. The pipeline copies the referenced files to the same
//! root-relative path, so `guide/img/logo.png` becomes
//! `/docs-assets/guide/img/logo.png`.

use super::CompileContext;
use super::urls::{dirname, join_normalized};

/// An asset path relative to the input root, plus any `?query` it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub rel_path: String,
    pub search: String,
}

/// Trim an assets base and drop one trailing `/`. Blank means "disabled".
///
/// Both absolute (`/docs-assets`) and relative (`docs-assets`) bases are
/// accepted.
pub fn normalize_assets_base(value: Option<&str>) -> Option<&str> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.strip_suffix('/').unwrap_or(trimmed))
}

/// Resolve `target` to a path inside the input root.
///
/// Returns `None` when asset rewriting is disabled, for anchors, absolute
/// paths and anything with a scheme, and for paths that escape the root.
pub fn resolve_asset_rel_path(target: &str, ctx: &CompileContext<'_>) -> Option<ResolvedAsset> {
    ctx.assets_base?;

    let target = target.trim().replace('\\', "/");
    if target.is_empty() || target.starts_with('#') || target.starts_with('/') || target.contains(':') {
        return None;
    }

    let (path, search) = match target.find('?') {
        Some(idx) => target.split_at(idx),
        None => (target.as_str(), ""),
    };
    let clean = path.strip_prefix("./").unwrap_or(path);
    if clean.is_empty() {
        return None;
    }

    let resolved = join_normalized(dirname(ctx.current_rel_path), clean);
    if resolved == "." || resolved == ".." || resolved.starts_with("../") {
        return None;
    }

    Some(ResolvedAsset {
        rel_path: resolved,
        search: search.to_string(),
    })
}

/// Build the public URL for a resolved asset.
pub fn to_asset_url(resolved: &ResolvedAsset, ctx: &CompileContext<'_>) -> String {
    format!(
        "{}/{}{}",
        ctx.assets_base.unwrap_or_default(),
        resolved.rel_path,
        resolved.search
    )
}
