// src/fs/mod.rs

//! Best-effort file lifecycle helpers for the output tree.
//!
//! Nothing here returns an error to the caller. Failures are logged and
//! turned into `false` / `None`, so a single unreadable or unwritable file
//! never takes the whole pipeline down. Callers treat `None` from a read as
//! "no prior state".

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, error, warn};

/// Returns true if `path` can be accessed. Any error counts as absence.
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref()).await.is_ok()
}

/// Returns true if `path` is an existing directory (symlinks followed).
pub async fn is_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Make sure every segment of `path` exists as a directory.
///
/// A non-directory sitting where a directory is needed is renamed to
/// `<name>.bak` first. Returns whether `path` is a directory afterwards.
pub async fn ensure_dir(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match try_ensure_dir(path).await {
        Ok(()) => true,
        Err(err) => {
            error!("creating directory {:?}: {err}", path);
            false
        }
    }
}

fn try_ensure_dir(path: &Path) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
    Box::pin(async move {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !is_dir(parent).await {
                try_ensure_dir(parent).await?;
            }
        }

        match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => {
                let backup = backup_path(path);
                warn!("{:?} is not a directory, moving it to {:?}", path, backup);
                fs::rename(path, &backup).await?;
                create_dir_tolerant(path).await
            }
            Err(_) => create_dir_tolerant(path).await,
        }
    })
}

/// `create_dir` that accepts losing a race against another creator.
async fn create_dir_tolerant(path: &Path) -> io::Result<()> {
    match fs::create_dir(path).await {
        Ok(()) => {
            debug!("created directory {:?}", path);
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && is_dir(path).await => Ok(()),
        Err(err) => Err(err),
    }
}

/// Sibling path with a `.bak` suffix appended to the file name.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Read a UTF-8 file, or `None` (logged) if that fails.
pub async fn read_text(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    match fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(err) => {
            error!("reading {:?}: {err}", path);
            None
        }
    }
}

/// Read and deserialize a JSON file, or `None` (logged) if either step fails.
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Option<T> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) => {
            warn!("reading {:?}: {err}", path);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("parsing JSON from {:?}: {err}", path);
            None
        }
    }
}

/// Write `content`, creating parent directories first.
pub async fn write_text(path: impl AsRef<Path>, content: &str) -> Option<()> {
    write_bytes(path, content.as_bytes()).await
}

/// Byte-oriented variant of [`write_text`].
pub async fn write_bytes(path: impl AsRef<Path>, content: &[u8]) -> Option<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !ensure_dir(parent).await {
            return None;
        }
    }
    match fs::write(path, content).await {
        Ok(()) => Some(()),
        Err(err) => {
            error!("writing {:?}: {err}", path);
            None
        }
    }
}

/// Remove a file or a whole directory tree. A missing path counts as removed.
pub async fn remove_path(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    let result = match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
        Ok(_) => fs::remove_file(path).await,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return true,
        Err(err) => Err(err),
    };
    match result {
        Ok(()) => true,
        Err(err) if err.kind() == io::ErrorKind::NotFound => true,
        Err(err) => {
            error!("removing {:?}: {err}", path);
            false
        }
    }
}
