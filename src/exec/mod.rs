// src/exec/mod.rs

//! External tool execution layer.
//!
//! - [`backend`] provides the `Toolchain` trait the pipeline depends on.
//! - [`command`] implements it by spawning the shell commands configured in
//!   `[tools]`, using `tokio::process::Command`.

pub mod backend;
pub mod command;

pub use backend::{Stage, ToolFuture, Toolchain};
pub use command::{expand_file_placeholder, CommandToolchain};
