// src/watch/watcher.rs

use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::tasks::{Category, CategoryMatcher, TaskContext};
use crate::watch::event::{classify, FileEvent};
use crate::watch::handler::apply_event;
use crate::watch::index::SourceIndex;
use crate::watch::path_utils::relative_str;

/// A live watch session for one category.
///
/// The underlying `RecommendedWatcher` stops when this is dropped.
pub struct WatchSession {
    category: Category,
    _inner: RecommendedWatcher,
}

impl WatchSession {
    pub fn category(&self) -> Category {
        self.category
    }
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Start watching the source root for files of `category`.
///
/// Returns as soon as the watcher is registered. Events are handled one at a
/// time on a background task; a failing event is logged and the session
/// keeps going. Category filtering happens in [`apply_event`], since a
/// directory event must reach it even though no glob names the directory.
pub fn spawn_watcher(ctx: Arc<TaskContext>, category: Category) -> Result<WatchSession> {
    let matcher = CategoryMatcher::new(category)?;
    let root = ctx.config.source_root.clone();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("mpbuild: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("mpbuild: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(%category, "watching {:?}", root);

    let mut index = SourceIndex::scan(&root, &matcher);
    debug!(%category, known = index.len(), "seeded source index");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(%category, "received notify event: {:?}", event);

            for file_event in classify(&event) {
                let Some(rel) = relative_str(&root, &file_event.path) else {
                    warn!(
                        "could not relativize path {:?} against root {:?}",
                        file_event.path, root
                    );
                    continue;
                };
                if rel.is_empty() {
                    continue;
                }

                // Re-anchor on the configured root so output derivation sees
                // the same prefix the compile pass used.
                let event = FileEvent::new(file_event.kind, root.join(&rel));
                if let Err(err) = apply_event(&ctx, &matcher, &mut index, &event).await {
                    error!(%category, path = %rel, "watch handler failed: {err}");
                }
            }
        }

        debug!(%category, "watch loop ended");
    });

    Ok(WatchSession {
        category,
        _inner: watcher,
    })
}
