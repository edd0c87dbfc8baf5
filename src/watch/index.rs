// src/watch/index.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::tasks::CategoryMatcher;

/// Source files a watch session currently has output for.
///
/// When a directory disappears the backend reports only the directory, so
/// the session looks up which of its files lived below it here.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    sources: BTreeSet<PathBuf>,
}

impl SourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the files currently under `root`.
    pub fn scan(root: &Path, matcher: &CategoryMatcher) -> Self {
        Self {
            sources: matcher.collect_sources(root).into_iter().collect(),
        }
    }

    pub fn insert(&mut self, source: impl Into<PathBuf>) {
        self.sources.insert(source.into());
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.sources.contains(source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Drop `path` and everything below it, returning what was dropped.
    pub fn remove_under(&mut self, path: &Path) -> Vec<PathBuf> {
        let gone: Vec<PathBuf> = self
            .sources
            .iter()
            .filter(|s| s.starts_with(path))
            .cloned()
            .collect();
        for source in &gone {
            self.sources.remove(source);
        }
        gone
    }
}
