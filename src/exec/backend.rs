// src/exec/backend.rs

//! Pluggable toolchain abstraction.
//!
//! The pipeline talks to a `Toolchain` instead of spawning processes itself.
//! This makes it easy to swap in a fake toolchain in tests while keeping the
//! production implementation in [`command`](super::command).

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::errors::Result;

/// Boxed future returned by toolchain operations.
pub type ToolFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Transform stage applied to a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Script transpilation (e.g. TypeScript or modern JS down to the runtime's JS).
    Script,
    /// Template compilation into markup.
    Template,
    /// Style post-processing.
    Style,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Script => "script",
            Stage::Template => "template",
            Stage::Style => "style",
        };
        f.write_str(name)
    }
}

/// External collaborators the pipeline delegates to.
///
/// Production code uses [`CommandToolchain`](super::CommandToolchain); tests
/// can provide an implementation that never spawns a process.
pub trait Toolchain: Send + Sync {
    /// Transform the contents of `source` for the given stage.
    ///
    /// `input` holds the file's current bytes; the returned bytes are written
    /// to the derived output path.
    fn transform<'a>(
        &'a self,
        stage: Stage,
        source: &'a Path,
        input: Vec<u8>,
    ) -> ToolFuture<'a, Vec<u8>>;

    /// Install the dependencies listed in `manifest` next to it.
    fn install<'a>(&'a self, manifest: &'a Path) -> ToolFuture<'a, ()>;
}
