// src/tasks/clean.rs

use std::io;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{BuildError, Result};
use crate::fs::{file_exists, remove_path};
use crate::paths::slash_path;
use crate::tasks::category::build_globset;

/// Empty the output root, keeping every top-level entry matched by `preserve`.
///
/// Returns the removed paths.
pub async fn clean_output(output_root: &Path, preserve: &[String]) -> Result<Vec<PathBuf>> {
    let include = build_globset(&["*"])?;
    let keep = build_globset(preserve)?;
    remove_matching(output_root, &include, &keep).await
}

/// Delete everything under `root` matching `include` except what `keep` matches.
///
/// Paths are matched relative to `root` with forward slashes. A kept
/// directory is not descended into; a matched directory is removed as a
/// whole. Every removal is attempted even if an earlier one failed.
pub async fn remove_matching(root: &Path, include: &GlobSet, keep: &GlobSet) -> Result<Vec<PathBuf>> {
    if !file_exists(root).await {
        debug!("{:?} does not exist, nothing to clean", root);
        return Ok(Vec::new());
    }

    let targets = removal_targets(root, include, keep);
    let mut failed = Vec::new();
    for target in &targets {
        debug!("removing {:?}", target);
        if !remove_path(target).await {
            failed.push(target.display().to_string());
        }
    }

    if !failed.is_empty() {
        return Err(BuildError::IoError(io::Error::other(format!(
            "could not remove: {}",
            failed.join(", ")
        ))));
    }

    info!("cleaned {} entries from {}", targets.len(), root.display());
    Ok(targets)
}

fn removal_targets(root: &Path, include: &GlobSet, keep: &GlobSet) -> Vec<PathBuf> {
    let mut targets = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry under {:?}: {err}", root);
                continue;
            }
        };
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = slash_path(rel);
        let is_dir = entry.file_type().is_dir();

        if keep.is_match(&rel) {
            if is_dir {
                walker.skip_current_dir();
            }
            continue;
        }

        if include.is_match(&rel) {
            targets.push(entry.into_path());
            if is_dir {
                walker.skip_current_dir();
            }
        }
    }

    targets
}
