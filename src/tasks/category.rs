// src/tasks/category.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::Result;
use crate::exec::Stage;
use crate::paths::slash_path;

/// The four kinds of source file the pipeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Everything that is not a script, template or style; copied verbatim.
    Assets,
    Script,
    Template,
    Style,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Assets,
        Category::Script,
        Category::Template,
        Category::Style,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Assets => "assets",
            Category::Script => "script",
            Category::Template => "template",
            Category::Style => "style",
        }
    }

    /// Name of the one-shot task for this category.
    pub fn compile_task(self) -> &'static str {
        match self {
            Category::Assets => "copy-assets",
            Category::Script => "compile-script",
            Category::Template => "compile-template",
            Category::Style => "compile-style",
        }
    }

    /// Name of the watch task for this category.
    pub fn watch_task(self) -> &'static str {
        match self {
            Category::Assets => "watch-assets",
            Category::Script => "watch-script",
            Category::Template => "watch-template",
            Category::Style => "watch-style",
        }
    }

    /// Transform applied to each file; `None` means a plain copy.
    pub fn stage(self) -> Option<Stage> {
        match self {
            Category::Assets => None,
            Category::Script => Some(Stage::Script),
            Category::Template => Some(Stage::Template),
            Category::Style => Some(Stage::Style),
        }
    }

    /// Globs, relative to the source root, selecting this category's files.
    pub fn include_patterns(self) -> &'static [&'static str] {
        match self {
            Category::Assets => &["**/*"],
            Category::Script => &["**/*.ts", "**/*.js"],
            Category::Template => &["**/*.pug", "**/*.jade"],
            Category::Style => &["**/*.css", "**/*.pcss"],
        }
    }

    pub fn exclude_patterns(self) -> &'static [&'static str] {
        match self {
            Category::Assets => &[
                "**/*.ts",
                "**/*.js",
                "**/*.css",
                "**/*.pcss",
                "**/*.pug",
                "**/*.jade",
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compiled include/exclude globs for one category.
#[derive(Clone)]
pub struct CategoryMatcher {
    category: Category,
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for CategoryMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryMatcher")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl CategoryMatcher {
    pub fn new(category: Category) -> Result<Self> {
        let include = build_globset(category.include_patterns())?;
        let exclude = if category.exclude_patterns().is_empty() {
            None
        } else {
            Some(build_globset(category.exclude_patterns())?)
        };
        Ok(Self {
            category,
            include,
            exclude,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Whether a path relative to the source root (forward slashes) belongs here.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Every regular file under `root` that matches, sorted.
    ///
    /// A missing root yields an empty list.
    pub fn collect_sources(&self, root: &Path) -> Vec<PathBuf> {
        self.collect_under(root, root)
    }

    /// Matching files below `dir`, with globs evaluated relative to `root`.
    ///
    /// Used when a whole directory appears inside the source root at once.
    pub fn collect_under(&self, root: &Path, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        debug!("{:?} not readable: {err}", dir);
                    } else {
                        warn!("skipping unreadable entry under {:?}: {err}", dir);
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            if self.matches(&slash_path(rel)) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        files
    }
}

/// Build a `GlobSet` where `*` does not cross directory separators.
pub fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat.as_ref())
            .literal_separator(true)
            .build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
