use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mpbuild::errors::BuildError;
use mpbuild::exec::{Stage, ToolFuture, Toolchain};

/// One recorded call into the fake toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Transform { stage: Stage, source: PathBuf },
    Install { manifest: PathBuf },
}

/// A toolchain that never spawns a process:
/// - transforms prefix the input with `/* <stage> */\n`
/// - files whose name was passed to `fail_on` produce a tool error
/// - install creates `node_modules/` next to the manifest
#[derive(Clone, Default)]
pub struct FakeToolchain {
    calls: Arc<Mutex<Vec<ToolCall>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make transforms of any file with this file name fail.
    pub fn fail_on(self, file_name: &str) -> Self {
        self.failing.lock().unwrap().insert(file_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transformed_sources(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ToolCall::Transform { source, .. } => Some(source),
                ToolCall::Install { .. } => None,
            })
            .collect()
    }

    /// Output the fake produces for a given stage and input.
    pub fn expected_output(stage: Stage, input: &str) -> String {
        format!("/* {stage} */\n{input}")
    }
}

impl Toolchain for FakeToolchain {
    fn transform<'a>(
        &'a self,
        stage: Stage,
        source: &'a Path,
        input: Vec<u8>,
    ) -> ToolFuture<'a, Vec<u8>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(ToolCall::Transform {
                stage,
                source: source.to_path_buf(),
            });

            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if self.failing.lock().unwrap().contains(&name) {
                return Err(BuildError::ToolError {
                    tool: format!("fake-{stage}"),
                    message: format!("syntax error in {name}"),
                });
            }

            let input = String::from_utf8_lossy(&input).to_string();
            Ok(Self::expected_output(stage, &input).into_bytes())
        })
    }

    fn install<'a>(&'a self, manifest: &'a Path) -> ToolFuture<'a, ()> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(ToolCall::Install {
                manifest: manifest.to_path_buf(),
            });
            if let Some(dir) = manifest.parent() {
                tokio::fs::create_dir_all(dir.join("node_modules")).await?;
            }
            Ok(())
        })
    }
}
