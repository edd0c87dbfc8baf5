// src/watch/event.rs

//! Translation of raw `notify` events into add/change/unlink.

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Add,
    Change,
    Unlink,
}

/// A single source-file change as seen by a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

impl FileEvent {
    pub fn new(kind: FileEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Map a notify event to zero or more file events.
///
/// Metadata-only changes and access notifications are dropped. Renames turn
/// into an unlink of the old name and an add of the new one; when the
/// backend cannot tell which side of a rename a path is, existence decides.
pub fn classify(event: &Event) -> Vec<FileEvent> {
    let all = |kind: FileEventKind| -> Vec<FileEvent> {
        event
            .paths
            .iter()
            .map(|p| FileEvent::new(kind, p.clone()))
            .collect()
    };

    match &event.kind {
        EventKind::Create(_) => all(FileEventKind::Add),
        EventKind::Remove(_) => all(FileEventKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(FileEventKind::Unlink),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(FileEventKind::Add),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let kind = if i == 0 {
                    FileEventKind::Unlink
                } else {
                    FileEventKind::Add
                };
                FileEvent::new(kind, p.clone())
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                let kind = if p.exists() {
                    FileEventKind::Add
                } else {
                    FileEventKind::Unlink
                };
                FileEvent::new(kind, p.clone())
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => all(FileEventKind::Change),
        _ => Vec::new(),
    }
}
