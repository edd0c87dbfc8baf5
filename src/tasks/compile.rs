// src/tasks/compile.rs

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::errors::{BuildError, Result};
use crate::fs::{is_dir, remove_path, write_bytes};
use crate::tasks::category::{Category, CategoryMatcher};
use crate::tasks::TaskContext;

/// Process every source file of a category. Stops at the first failure.
///
/// Returns the number of files written.
pub async fn compile_all(ctx: &TaskContext, matcher: &CategoryMatcher) -> Result<usize> {
    let sources = matcher.collect_sources(&ctx.config.source_root);
    debug!(
        category = %matcher.category(),
        count = sources.len(),
        "collected sources"
    );

    let mut written = 0;
    for source in &sources {
        if compile_one(ctx, matcher.category(), source).await?.is_some() {
            written += 1;
        }
    }
    Ok(written)
}

/// Copy or transform a single source file into the output root.
///
/// Returns the written path, or `None` if there was nothing to do (the source
/// vanished, is a directory, or lies outside the source root).
pub async fn compile_one(
    ctx: &TaskContext,
    category: Category,
    source: &Path,
) -> Result<Option<PathBuf>> {
    let Some(target) = ctx.output_path_for(source) else {
        warn!("{:?} is outside the source root, skipping", source);
        return Ok(None);
    };

    let input = match tokio::fs::read(source).await {
        Ok(bytes) => bytes,
        Err(err) if matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
            debug!("{:?} not readable as a file ({err}), skipping", source);
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let output = match category.stage() {
        None => {
            info!("Copy {}", source.display());
            input
        }
        Some(stage) => {
            info!("Compiling {}", source.display());
            match ctx.toolchain.transform(stage, source, input).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    error!("{} failed for {}: {err}", stage, source.display());
                    return Err(err);
                }
            }
        }
    };

    if write_bytes(&target, &output).await.is_none() {
        return Err(BuildError::IoError(io::Error::other(format!(
            "could not write {}",
            target.display()
        ))));
    }
    Ok(Some(target))
}

/// Delete the output that `source` compiles to.
///
/// Only a file is ever removed. If the derived path is a directory (the
/// source was a directory) it is left alone, since other categories and
/// hand-placed files may live below it. Returns the removed path.
pub async fn remove_output(ctx: &TaskContext, source: &Path) -> Option<PathBuf> {
    let target = ctx.output_path_for(source)?;
    if is_dir(&target).await {
        debug!("{:?} is a directory, not removing", target);
        return None;
    }
    warn!("Remove {}", target.display());
    remove_path(&target).await;
    Some(target)
}
