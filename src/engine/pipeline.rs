// src/engine/pipeline.rs

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::dag::{LeafFuture, LeafRunner, TaskKind};
use crate::errors::Result;
use crate::tasks::{clean_output, compile_all, install_dependencies, CategoryMatcher, TaskContext};
use crate::watch::{spawn_watcher, WatchSession};

/// Production [`LeafRunner`]: binds each task kind to its body.
///
/// Watch sessions started by `watch-*` tasks are kept here for the rest of
/// the process lifetime.
pub struct Pipeline {
    ctx: Arc<TaskContext>,
    sessions: Mutex<Vec<WatchSession>>,
}

impl Pipeline {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Number of watch sessions currently alive.
    pub async fn active_watchers(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn run_kind(&self, kind: TaskKind) -> Result<()> {
        let config = &self.ctx.config;
        match kind {
            TaskKind::Clean => {
                clean_output(&config.output_root, &config.preserve).await?;
            }
            TaskKind::InstallDependencies => {
                install_dependencies(&self.ctx).await?;
            }
            TaskKind::Compile(category) => {
                let matcher = CategoryMatcher::new(category)?;
                let written = compile_all(&self.ctx, &matcher).await?;
                debug!(%category, written, "compile pass done");
            }
            TaskKind::Watch(category) => {
                let session = spawn_watcher(Arc::clone(&self.ctx), category)?;
                self.sessions.lock().await.push(session);
            }
        }
        Ok(())
    }
}

impl LeafRunner for Pipeline {
    fn run_leaf<'a>(&'a self, name: &'a str, kind: TaskKind, run_id: u64) -> LeafFuture<'a> {
        Box::pin(async move {
            debug!(task = %name, run_id, "pipeline executing task body");
            self.run_kind(kind).await
        })
    }
}
