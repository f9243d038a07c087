use std::collections::{HashMap, HashSet};

use crate::text::slugify;

/// Hands out unique heading ids within one document.
///
/// The first heading with a given slug gets it as-is; later ones get `-2`,
/// `-3`, … appended, skipping any suffixed id an earlier heading already
/// took verbatim. A fresh allocator is used per compile call.
///
/// ```
/// use pagebake::markdown::HeadingIdAllocator;
///
/// let mut ids = HeadingIdAllocator::default();
/// assert_eq!(ids.allocate("Setup"), "setup");
/// assert_eq!(ids.allocate("Setup"), "setup-2");
/// assert_eq!(ids.allocate("setup!"), "setup-3");
/// ```
#[derive(Debug, Default)]
pub struct HeadingIdAllocator {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl HeadingIdAllocator {
    pub fn allocate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.counts.entry(base.clone()).or_insert(0);
        loop {
            *count += 1;
            let candidate = if *count == 1 {
                base.clone()
            } else {
                format!("{base}-{count}")
            };
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
