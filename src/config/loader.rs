// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ProjectConfig, RawConfigFile};
use crate::errors::Result;

/// Load a project file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a project file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ProjectConfig::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the built-in defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ProjectConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("no project file at {:?}, using defaults", path);
        return Ok(ProjectConfig::default());
    }
    load_and_validate(path)
}

/// Directory that relative project paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "app/mpbuild.toml"),
///   we use that directory.
/// - If it's just a bare filename, fall back to the current working directory.
pub fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
