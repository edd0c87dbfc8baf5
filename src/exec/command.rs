// src/exec/command.rs

use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{BuildConfig, ToolsSection};
use crate::errors::{BuildError, Result};
use crate::exec::backend::{Stage, ToolFuture, Toolchain};

/// Toolchain backed by shell commands from the `[tools]` section.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    tools: ToolsSection,
    node_env: &'static str,
}

impl CommandToolchain {
    pub fn new(tools: ToolsSection, config: &BuildConfig) -> Self {
        Self {
            tools,
            node_env: config.node_env(),
        }
    }

    fn command_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::Script => &self.tools.script,
            Stage::Template => &self.tools.template,
            Stage::Style => &self.tools.style,
        }
    }

    async fn run_filter(&self, stage: Stage, source: &Path, input: Vec<u8>) -> Result<Vec<u8>> {
        let template = self.command_for(stage);
        if template.trim().is_empty() {
            return Ok(input);
        }
        let cmdline = expand_file_placeholder(template, source);
        debug!(%stage, cmd = %cmdline, "running transform");

        let mut cmd = shell_command(&cmdline);
        cmd.env("NODE_ENV", self.node_env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|err| BuildError::ToolError {
            tool: cmdline.clone(),
            message: format!("spawning process: {err}"),
        })?;

        // Feed stdin from a separate task so a tool that streams its output
        // cannot deadlock against a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                // The tool may exit without reading everything; that is its call.
                let _ = stdin.write_all(&input).await;
            })
        });

        let output = child.wait_with_output().await?;
        if let Some(writer) = writer {
            let _ = writer.await;
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::ToolError {
                tool: cmdline,
                message: format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(output.stdout)
    }

    async fn run_install(&self, manifest: &Path) -> Result<()> {
        let dir = manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let cmdline = expand_file_placeholder(&self.tools.install, manifest);
        info!(cmd = %cmdline, dir = ?dir, "installing dependencies");

        let mut cmd = shell_command(&cmdline);
        cmd.current_dir(dir)
            .env("NODE_ENV", self.node_env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = cmd.output().await.map_err(|err| BuildError::ToolError {
            tool: cmdline.clone(),
            message: format!("spawning process: {err}"),
        })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("install stdout: {}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("install stderr: {}", line);
        }

        if !output.status.success() {
            return Err(BuildError::ToolError {
                tool: cmdline,
                message: format!("exit code {}", output.status.code().unwrap_or(-1)),
            });
        }
        Ok(())
    }
}

impl Toolchain for CommandToolchain {
    fn transform<'a>(
        &'a self,
        stage: Stage,
        source: &'a Path,
        input: Vec<u8>,
    ) -> ToolFuture<'a, Vec<u8>> {
        Box::pin(self.run_filter(stage, source, input))
    }

    fn install<'a>(&'a self, manifest: &'a Path) -> ToolFuture<'a, ()> {
        Box::pin(self.run_install(manifest))
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmdline: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    }
}

/// Replace every `{file}` in `template` with the quoted path.
pub fn expand_file_placeholder(template: &str, file: &Path) -> String {
    if !template.contains("{file}") {
        return template.to_string();
    }
    template.replace("{file}", &quote_arg(&file.to_string_lossy()))
}

fn quote_arg(arg: &str) -> String {
    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
