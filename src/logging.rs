// src/logging.rs

//! Logging setup: a `tracing-subscriber` fmt layer writing to stderr.
//!
//! The filter comes from the first of:
//! 1. `--log-level`
//! 2. `MPBUILD_LOG`, which takes full `EnvFilter` directives
//!    (e.g. `info,mpbuild::watch=debug`)
//! 3. `info`
//!
//! stdout stays free for `--dry-run` output.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable consulted when no level is given on the command line.
pub const LOG_ENV: &str = "MPBUILD_LOG";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing the tracing subscriber: {err}"))
}

/// Resolve the filter from the CLI level and the raw environment value.
///
/// An unparsable environment value falls back to `info`; a CLI level always wins.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return EnvFilter::try_new(level.as_directive())
            .with_context(|| format!("invalid log level {level:?}"));
    }

    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(filter) => Ok(filter),
            Err(err) => {
                eprintln!("mpbuild: ignoring {LOG_ENV}={directives:?}: {err}");
                Ok(EnvFilter::new("info"))
            }
        },
        None => Ok(EnvFilter::new("info")),
    }
}
