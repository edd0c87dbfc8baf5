// src/watch/handler.rs

use tracing::{debug, error};

use crate::errors::Result;
use crate::fs::is_dir;
use crate::paths::{relative_to_root, slash_path};
use crate::tasks::{compile_one, remove_output, CategoryMatcher, TaskContext};
use crate::watch::event::{FileEvent, FileEventKind};
use crate::watch::index::SourceIndex;

/// Apply one file event to the output tree.
///
/// - `add` / `change` of a file of this category (re)produces its output.
/// - `add` of a directory compiles every matching file inside it.
/// - `unlink` removes the outputs of the known sources at or below the
///   path, so removing a directory only touches files this session owns.
///
/// Events for files of other categories are ignored.
pub async fn apply_event(
    ctx: &TaskContext,
    matcher: &CategoryMatcher,
    index: &mut SourceIndex,
    event: &FileEvent,
) -> Result<()> {
    let belongs = relative_to_root(&event.path, &ctx.config.source_root)
        .map(|rel| matcher.matches(&slash_path(rel)))
        .unwrap_or(false);
    let added_dir = event.kind == FileEventKind::Add && is_dir(&event.path).await;

    match event.kind {
        FileEventKind::Add if added_dir => {
            compile_directory(ctx, matcher, index, event).await?;
        }
        FileEventKind::Add | FileEventKind::Change => {
            if belongs && compile_one(ctx, matcher.category(), &event.path).await?.is_some() {
                index.insert(event.path.clone());
            }
        }
        FileEventKind::Unlink => {
            let gone = index.remove_under(&event.path);
            if gone.is_empty() {
                if belongs {
                    remove_output(ctx, &event.path).await;
                }
            } else {
                debug!(count = gone.len(), "{:?} removed", event.path);
                for source in &gone {
                    remove_output(ctx, source).await;
                }
            }
        }
    }
    Ok(())
}

/// Compile every matching file below a directory that just appeared.
///
/// All files are attempted; the first failure is returned afterwards.
async fn compile_directory(
    ctx: &TaskContext,
    matcher: &CategoryMatcher,
    index: &mut SourceIndex,
    event: &FileEvent,
) -> Result<()> {
    let sources = matcher.collect_under(&ctx.config.source_root, &event.path);
    debug!(count = sources.len(), "directory {:?} added", event.path);

    let mut first_failure = None;
    for source in sources {
        match compile_one(ctx, matcher.category(), &source).await {
            Ok(Some(_)) => index.insert(source),
            Ok(None) => {}
            Err(err) => {
                error!("{}: {err}", source.display());
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
