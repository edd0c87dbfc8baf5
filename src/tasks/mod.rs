// src/tasks/mod.rs

//! Bodies of the leaf tasks.
//!
//! - [`category`]: which source files each compile/watch task owns.
//! - [`compile`]: per-file copy/transform and the one-shot compile pass.
//! - [`clean`]: output-root cleanup with a preserve set.
//! - [`install`]: production manifest derivation and dependency install.

pub mod category;
pub mod clean;
pub mod compile;
pub mod install;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::exec::Toolchain;
use crate::paths::{derive_output_path, ExtensionMap};

pub use category::{Category, CategoryMatcher};
pub use clean::{clean_output, remove_matching};
pub use compile::{compile_all, compile_one, remove_output};
pub use install::{install_dependencies, production_manifest, write_production_manifest};

/// Everything a task body needs: configuration plus external tools.
#[derive(Clone)]
pub struct TaskContext {
    pub config: Arc<BuildConfig>,
    pub toolchain: Arc<dyn Toolchain>,
    pub extensions: ExtensionMap,
}

impl TaskContext {
    pub fn new(config: Arc<BuildConfig>, toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            config,
            toolchain,
            extensions: ExtensionMap::default(),
        }
    }

    /// Output path for a source file, see [`derive_output_path`].
    pub fn output_path_for(&self, source: &Path) -> Option<PathBuf> {
        derive_output_path(
            source,
            &self.config.source_root,
            &self.config.output_root,
            &self.extensions,
        )
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
