// src/engine/mod.rs

//! Execution engine for mpbuild.
//!
//! [`Pipeline`] is the production `LeafRunner` handed to the DAG scheduler.
//! It owns the task context (config + toolchain) and every watch session
//! started during the run.

pub mod pipeline;

pub use pipeline::Pipeline;
