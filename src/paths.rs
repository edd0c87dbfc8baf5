// src/paths.rs

//! Source-to-output path derivation.
//!
//! The compile tasks and the unlink handler both go through
//! [`derive_output_path`], so whatever a compile writes, an unlink removes.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Extension renames applied when writing into the output root.
///
/// Keys and values are bare extensions without the leading dot.
pub const EXTENSION_RULES: &[(&str, &str)] = &[
    ("jade", "wxml"),
    ("pug", "wxml"),
    ("ts", "js"),
    ("pcss", "wxss"),
    ("css", "wxss"),
];

/// Lookup table from source extension to output extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    rules: BTreeMap<String, String>,
}

impl ExtensionMap {
    /// Build a map from `(source, output)` extension pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let rules = pairs
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self { rules }
    }

    /// Output extension for `ext`; unmapped extensions pass through.
    pub fn map<'a>(&'a self, ext: &'a str) -> &'a str {
        self.rules.get(ext).map(String::as_str).unwrap_or(ext)
    }

    /// Apply the map to the final extension of `path`.
    pub fn apply(&self, path: &Path) -> PathBuf {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => path.with_extension(self.map(ext)),
            None => path.to_path_buf(),
        }
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::from_pairs(EXTENSION_RULES.iter().copied())
    }
}

/// Compute the output path for a source file.
///
/// `source` may be relative to `source_root` or absolute. An absolute path
/// outside `source_root` has no output counterpart and yields `None`, as do
/// paths that climb out of the root with `..`.
pub fn derive_output_path(
    source: &Path,
    source_root: &Path,
    output_root: &Path,
    extensions: &ExtensionMap,
) -> Option<PathBuf> {
    let rel = relative_to_root(source, source_root)?;
    Some(extensions.apply(&output_root.join(rel)))
}

/// Path of `source` relative to `root`, if it lies inside it.
pub fn relative_to_root<'a>(source: &'a Path, root: &Path) -> Option<&'a Path> {
    let rel = if source.is_absolute() || source.starts_with(root) {
        source.strip_prefix(root).ok()?
    } else {
        source
    };

    let escapes = rel
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes || rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel)
}

/// Relative path rendered with forward slashes, for glob matching and logs.
pub fn slash_path(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
