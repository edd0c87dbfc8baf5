// src/dag/scheduler.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::dag::graph::{TaskDef, TaskGraph, TaskKind, TaskNode};
use crate::dag::sequence::IdSequence;
use crate::errors::{BuildError, Result};

/// Boxed future returned by [`LeafRunner::run_leaf`].
pub type LeafFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Executes the body of a leaf task.
///
/// Production code uses the pipeline in `engine`; tests plug in a recorder.
pub trait LeafRunner: Send + Sync {
    fn run_leaf<'a>(&'a self, name: &'a str, kind: TaskKind, run_id: u64) -> LeafFuture<'a>;
}

/// Runs named tasks from a validated [`TaskGraph`].
///
/// - `Series` awaits each child before starting the next and stops at the
///   first failure.
/// - `Parallel` spawns every child, waits for all of them (a failing child
///   does not cancel its siblings) and then reports the first failure.
#[derive(Clone)]
pub struct Scheduler {
    graph: Arc<TaskGraph>,
    runner: Arc<dyn LeafRunner>,
    ids: Arc<IdSequence>,
}

impl Scheduler {
    /// Validate `graph` and wrap it for execution.
    pub fn new(graph: TaskGraph, runner: Arc<dyn LeafRunner>, ids: IdSequence) -> Result<Self> {
        graph.validate()?;
        Ok(Self {
            graph: Arc::new(graph),
            runner,
            ids: Arc::new(ids),
        })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Run the task registered under `name` to completion.
    pub async fn run(&self, name: &str) -> Result<()> {
        if !self.graph.contains(name) {
            return Err(BuildError::TaskNotFound(name.to_string()));
        }
        self.run_node(TaskNode::task(name)).await
    }

    fn run_node(&self, node: TaskNode) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>> {
        let this = self.clone();
        Box::pin(async move {
            match node {
                TaskNode::Ref(name) => this.run_named(name).await,
                TaskNode::Series(children) => {
                    for child in children {
                        this.run_node(child).await?;
                    }
                    Ok(())
                }
                TaskNode::Parallel(children) => this.run_parallel(children).await,
            }
        })
    }

    async fn run_parallel(&self, children: Vec<TaskNode>) -> Result<()> {
        let mut set = JoinSet::new();
        for child in children {
            set.spawn(self.run_node(child));
        }

        let mut first_failure: Option<BuildError> = None;
        while let Some(joined) = set.join_next().await {
            let outcome = match joined {
                Ok(result) => result,
                Err(join_err) => Err(BuildError::Other(join_err.into())),
            };
            if let Err(err) = outcome {
                debug!(error = %err, "parallel member failed");
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn run_named(&self, name: String) -> Result<()> {
        let def = self
            .graph
            .get(&name)
            .cloned()
            .ok_or_else(|| BuildError::TaskNotFound(name.clone()))?;

        let started = Instant::now();
        info!("Starting '{}'...", name);

        let result = match def {
            TaskDef::Leaf(kind) => {
                let run_id = self.ids.next_id();
                debug!(task = %name, run_id, ?kind, "running leaf task");
                self.runner
                    .run_leaf(&name, kind, run_id)
                    .await
                    .map_err(|err| match err {
                        BuildError::TaskFailed { .. } => err,
                        other => BuildError::TaskFailed {
                            task: name.clone(),
                            reason: other.to_string(),
                        },
                    })
            }
            TaskDef::Composite(node) => self.run_node(node).await,
        };

        match &result {
            Ok(()) => info!("Finished '{}' after {:?}", name, started.elapsed()),
            Err(err) => error!("'{}' errored after {:?}: {}", name, started.elapsed(), err),
        }
        result
    }
}
