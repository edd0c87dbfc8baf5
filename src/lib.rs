// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod tasks;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_or_default, project_root, BuildConfig, BuildFlags};
use crate::dag::{IdSequence, Scheduler, TaskGraph};
use crate::engine::Pipeline;
use crate::exec::{CommandToolchain, Toolchain};
use crate::tasks::TaskContext;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project file loading and flag resolution
/// - the standard task graph
/// - the command toolchain and pipeline
/// - Ctrl-C handling while watch sessions are alive
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let project = load_or_default(&config_path)?;
    let flags = BuildFlags {
        is_development: args.develop,
        is_watch_enabled: args.watch,
    };
    let config = Arc::new(BuildConfig::resolve(
        &project,
        &project_root(&config_path),
        flags,
    )?);

    let graph = TaskGraph::standard()?;
    let task = args.resolve_task(&graph)?.to_string();

    if args.dry_run {
        print_dry_run(&config, &graph, &task)?;
        return Ok(());
    }

    let toolchain: Arc<dyn Toolchain> =
        Arc::new(CommandToolchain::new(project.tools.clone(), &config));
    let pipeline = Arc::new(Pipeline::new(TaskContext::new(config, toolchain)));
    let scheduler = Scheduler::new(graph, pipeline.clone(), IdSequence::from_clock())?;

    scheduler.run(&task).await?;

    let watchers = pipeline.active_watchers().await;
    if watchers > 0 {
        info!(watchers, "watching for changes, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        info!("shutdown requested");
    }

    Ok(())
}

/// Print resolved settings and the task tree, without executing anything.
fn print_dry_run(config: &BuildConfig, graph: &TaskGraph, task: &str) -> Result<()> {
    let tree = graph.describe(task)?;

    println!("mpbuild dry-run");
    println!("  source  = {}", config.source_root.display());
    println!("  output  = {}", config.output_root.display());
    println!("  manifest = {}", config.manifest_path.display());
    println!("  preserve = {:?}", config.preserve);
    println!("  NODE_ENV = {}", config.node_env());
    println!();
    println!("task tree:");
    for line in tree.lines() {
        println!("  {line}");
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
