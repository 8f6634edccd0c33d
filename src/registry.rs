//! Per-build accumulation of executable blocks, keyed by page then line.
//!
//! ## Lifecycle
//!
//! One registry per build session. A page's slot is either *empty* (never seen, or just
//! [`BlockRegistry::reset`]) or *populated* by [`BlockRegistry::record`] calls during that page's scan.
//! Workers each own a private registry for the pages they scan; the session folds them back with
//! [`BlockRegistry::merge_from`], which replaces a page's whole entry set. Two workers never scan the
//! same page, so merging disjoint pages is order-independent.

use std::collections::BTreeMap;

use indexmap::IndexMap;

/// Executable code per (page, line).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRegistry {
    pages: BTreeMap<String, IndexMap<usize, String>>,
}

/// One page's blocks in ascending line order, ready to become test units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDoctests {
    pub page: String,
    pub blocks: Vec<(usize, String)>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every entry for `page`, leaving an empty slot. Idempotent.
    pub fn reset(&mut self, page: &str) {
        self.pages.insert(page.to_string(), IndexMap::new());
    }

    /// Insert or overwrite the code recorded for `(page, line)`.
    pub fn record(&mut self, page: &str, line: usize, code: impl Into<String>) {
        self.pages.entry(page.to_string()).or_default().insert(line, code.into());
    }

    /// Replace this registry's entries for each named page with `other`'s, wholesale.
    ///
    /// A page that `other` never saw becomes empty here, never partially merged.
    pub fn merge_from<I, S>(&mut self, pages: I, other: &BlockRegistry)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for page in pages {
            let page = page.as_ref();
            let entries = other.pages.get(page).cloned().unwrap_or_default();
            tracing::debug!(page, blocks = entries.len(), "merging page");
            self.pages.insert(page.to_string(), entries);
        }
    }

    /// Entries for one page, in insertion order.
    pub fn get(&self, page: &str) -> Option<&IndexMap<usize, String>> {
        self.pages.get(page)
    }

    /// Page identifiers with a slot, sorted.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Number of page slots (empty ones included).
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of recorded blocks across all pages.
    pub fn block_count(&self) -> usize {
        self.pages.values().map(IndexMap::len).sum()
    }

    /// Every page with its blocks sorted by ascending line.
    ///
    /// Pages with an empty slot are included with no blocks, so consumers can clear stale output.
    pub fn materialize(&self) -> Vec<PageDoctests> {
        self.pages
            .iter()
            .map(|(page, entries)| {
                let mut blocks: Vec<(usize, String)> =
                    entries.iter().map(|(line, code)| (*line, code.clone())).collect();
                blocks.sort_by_key(|(line, _)| *line);
                PageDoctests {
                    page: page.clone(),
                    blocks,
                }
            })
            .collect()
    }
}
