use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mpbuild::dag::{LeafFuture, LeafRunner, TaskKind};
use mpbuild::errors::BuildError;

/// A leaf runner that:
/// - records `start:<name>` / `end:<name>` / `fail:<name>` in order
/// - optionally sleeps per task before finishing
/// - fails the tasks it was told to fail
#[derive(Clone, Default)]
pub struct RecordingRunner {
    log: Arc<Mutex<Vec<String>>>,
    run_ids: Arc<Mutex<Vec<u64>>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn delay(mut self, name: &str, millis: u64) -> Self {
        self.delays
            .insert(name.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn run_ids(&self) -> Vec<u64> {
        self.run_ids.lock().unwrap().clone()
    }

    /// Names of tasks that started, in start order.
    pub fn started(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|e| e.strip_prefix("start:").map(str::to_string))
            .collect()
    }

    /// Index of an entry in the log, if present.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.log().iter().position(|e| e == entry)
    }
}

impl LeafRunner for RecordingRunner {
    fn run_leaf<'a>(&'a self, name: &'a str, _kind: TaskKind, run_id: u64) -> LeafFuture<'a> {
        Box::pin(async move {
            self.log.lock().unwrap().push(format!("start:{name}"));
            self.run_ids.lock().unwrap().push(run_id);

            if let Some(delay) = self.delays.get(name) {
                tokio::time::sleep(*delay).await;
            }

            if self.failing.contains(name) {
                self.log.lock().unwrap().push(format!("fail:{name}"));
                return Err(BuildError::ToolError {
                    tool: name.to_string(),
                    message: "told to fail".to_string(),
                });
            }

            self.log.lock().unwrap().push(format!("end:{name}"));
            Ok(())
        })
    }
}
