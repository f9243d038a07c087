//! Development watch loop.
//!
//! A recursive `notify` watcher feeds a channel; one loop drains it and
//! runs rebuilds on the calling thread:
//!
//! ```text
//! notify thread ──(relevant event)──▶ channel ──▶ rebuild_loop
//!                                                  │ wait for a request
//!                                                  │ wait until 125 ms of quiet
//!                                                  └ rebuild once
//! ```
//!
//! Rebuilds never overlap because they only ever run on the loop thread.
//! Requests that arrive while a rebuild is in flight pile up in the
//! channel and are drained together afterwards, so they collapse into a
//! single follow-up rebuild.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;

use crate::config::ScanConfig;

/// Quiet period before a burst of changes triggers a rebuild.
pub const DEBOUNCE: Duration = Duration::from_millis(125);

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Input directory not found: {0}")]
    MissingInput(PathBuf),
}

/// Whether `event` should trigger a rebuild of the tree rooted at `root`.
///
/// Paths under dot-prefixed or skipped directories never count. Structural
/// changes (create, remove, rename) count for `.md` files and for
/// extension-less paths, which are usually directories. Content changes
/// count for `.md` files only.
pub fn is_relevant_change(event: &Event, root: &Path, config: &ScanConfig) -> bool {
    let structural = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
    );
    if !structural && !matches!(event.kind, EventKind::Modify(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| is_relevant_path(path, root, config, structural))
}

fn is_relevant_path(path: &Path, root: &Path, config: &ScanConfig, structural: bool) -> bool {
    let Ok(rel) = path.strip_prefix(root) else {
        return false;
    };
    let segments: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    let Some(last) = segments.last() else {
        return structural;
    };
    if segments
        .iter()
        .any(|s| s.starts_with('.') || config.is_skipped_dir(s))
    {
        return false;
    }

    match Path::new(&**last).extension() {
        Some(ext) => ext.eq_ignore_ascii_case("md"),
        None => structural,
    }
}

/// Run `rebuild` once per burst of requests until the sender side closes.
pub fn rebuild_loop(requests: Receiver<()>, debounce: Duration, mut rebuild: impl FnMut()) {
    while requests.recv().is_ok() {
        loop {
            match requests.recv_timeout(debounce) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    rebuild();
                    return;
                }
            }
        }
        rebuild();
    }
}

/// Watch `input_dir` and call `on_change` after every relevant burst of
/// changes. Blocks for as long as the watcher lives.
pub fn watch(input_dir: &Path, config: &ScanConfig, on_change: impl FnMut()) -> Result<(), WatchError> {
    let root = input_dir
        .canonicalize()
        .map_err(|_| WatchError::MissingInput(input_dir.to_path_buf()))?;

    let (tx, rx) = mpsc::channel();
    let filter_root = root.clone();
    let filter_config = config.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_relevant_change(&event, &filter_root, &filter_config) => {
            tracing::debug!(kind = ?event.kind, paths = ?event.paths, "change detected");
            let _ = tx.send(());
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "watcher error"),
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    tracing::info!(root = %root.display(), "watching for changes");

    rebuild_loop(rx, DEBOUNCE, on_change);
    Ok(())
}
