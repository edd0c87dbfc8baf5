// src/watch/mod.rs

//! File watching for the `watch-*` tasks.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) per category.
//! - Turning raw notify events into add/change/unlink (`event`).
//! - Applying those to the output tree (`handler`), with the session's
//!   known sources kept in `index` so directory removals stay exact.
//!
//! It does **not** know about the task graph; a watch task simply starts a
//! session and finishes.

pub mod event;
pub mod handler;
pub mod index;
pub mod path_utils;
pub mod watcher;

pub use event::{classify, FileEvent, FileEventKind};
pub use handler::apply_event;
pub use index::SourceIndex;
pub use watcher::{spawn_watcher, WatchSession};
