// src/config/mod.rs

//! Configuration loading and validation for mpbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed project model and the resolved `BuildConfig` (`model.rs`).
//! - Load a project file from disk (`loader.rs`).
//! - Validate basic invariants like root separation (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default, project_root};
pub use model::{
    BuildConfig, BuildFlags, CleanSection, PathsSection, ProjectConfig, RawConfigFile,
    ToolsSection,
};
pub use validate::validate_roots;
