// src/dag/mod.rs

//! Task graph representation and execution.
//!
//! - [`graph`] holds the registry of named task descriptors and validates it.
//! - [`scheduler`] walks a task's series/parallel structure and runs leaves.
//! - [`sequence`] hands out run IDs for leaf invocations.

pub mod graph;
pub mod scheduler;
pub mod sequence;

pub use graph::{TaskDef, TaskGraph, TaskKind, TaskName, TaskNode};
pub use scheduler::{LeafFuture, LeafRunner, Scheduler};
pub use sequence::IdSequence;
