// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::dag::TaskGraph;
use crate::errors::{BuildError, Result};

/// Command-line arguments for `mpbuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mpbuild",
    version,
    about = "Build a mini-program source tree into its distribution directory.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (e.g. `build`, `dev`, `clean`, `compile-style`).
    ///
    /// Defaults to `dev` when `--watch` is given, `build` otherwise.
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Development semantics (`NODE_ENV=development` for external tools).
    #[arg(long)]
    pub develop: bool,

    /// Keep watching the source tree after the initial pass.
    ///
    /// Without TASK this selects `dev`. With TASK it is only accepted for
    /// tasks that start watchers (`dev`, `watch-*`); `build --watch` is an error.
    #[arg(long)]
    pub watch: bool,

    /// Path to the project file (TOML).
    ///
    /// A missing file at the default location falls back to built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "mpbuild.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MPBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the task tree that would run, without executing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Name of the task to run once defaults are applied.
    pub fn task_name(&self) -> &str {
        match self.task.as_deref() {
            Some(name) => name,
            None if self.watch => "dev",
            None => "build",
        }
    }

    /// The task to run, rejecting `--watch` on a task that never watches.
    pub fn resolve_task(&self, graph: &TaskGraph) -> Result<&str> {
        let name = self.task_name();
        if self.watch
            && self.task.is_some()
            && graph.contains(name)
            && !graph.starts_watchers(name)
        {
            return Err(BuildError::ConfigError(format!(
                "--watch has no effect on task '{name}'; run `dev` or a watch-* task instead"
            )));
        }
        Ok(name)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
