// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;

use crate::config::model::{ProjectConfig, RawConfigFile};
use crate::errors::{BuildError, Result};

impl TryFrom<RawConfigFile> for ProjectConfig {
    type Error = crate::errors::BuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ProjectConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_roots(&cfg.paths.source, &cfg.paths.output)?;
    validate_preserve(cfg)?;
    validate_tools(cfg)?;
    Ok(())
}

/// Source and output roots must be distinct and must not contain each other.
///
/// Nesting would make the watcher observe its own output.
pub fn validate_roots(source: &Path, output: &Path) -> Result<()> {
    let source = normalize(source);
    let output = normalize(output);

    if source == output {
        return Err(BuildError::ConfigError(format!(
            "source and output roots are the same directory: {:?}",
            source
        )));
    }
    if output.starts_with(&source) || source.starts_with(&output) {
        return Err(BuildError::ConfigError(format!(
            "source root {:?} and output root {:?} must not be nested",
            source, output
        )));
    }
    Ok(())
}

fn validate_preserve(cfg: &RawConfigFile) -> Result<()> {
    for pattern in cfg.clean.preserve.iter() {
        if Path::new(pattern).is_absolute() {
            return Err(BuildError::ConfigError(format!(
                "[clean].preserve entry '{}' must be relative to the output root",
                pattern
            )));
        }
        Glob::new(pattern)?;
    }
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tools.install.trim().is_empty() {
        return Err(BuildError::ConfigError(
            "[tools].install must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Lexical normalization: drops `.` components and folds `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
