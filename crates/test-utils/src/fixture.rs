use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mpbuild::config::{BuildConfig, BuildFlags, ProjectConfig};
use mpbuild::exec::Toolchain;
use mpbuild::tasks::TaskContext;
use tempfile::TempDir;

/// Temporary project tree with `src/`, `dist/` and a `package.json` slot.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("creating temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("creating src");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    /// Write a file below `src/`, creating directories as needed.
    pub fn write_source(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.src().join(rel), content)
    }

    /// Write a file below `dist/`, creating directories as needed.
    pub fn write_output(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.dist().join(rel), content)
    }

    pub fn write_manifest(&self, json: &str) -> PathBuf {
        write_file(&self.root().join("package.json"), json)
    }

    pub fn read_output(&self, rel: &str) -> String {
        fs::read_to_string(self.dist().join(rel)).expect("reading output file")
    }

    /// Relative paths of every file under `dist/`, sorted, with forward slashes.
    pub fn output_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        collect_files(&self.dist(), &self.dist(), &mut files);
        files.sort();
        files
    }

    pub fn config(&self, flags: BuildFlags) -> BuildConfig {
        BuildConfig::resolve(&ProjectConfig::default(), self.root(), flags)
            .expect("resolving default config")
    }

    pub fn context(&self, toolchain: Arc<dyn Toolchain>) -> TaskContext {
        TaskContext::new(Arc::new(self.config(BuildFlags::default())), toolchain)
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("creating parent dirs");
    }
    fs::write(path, content).expect("writing file");
    path.to_path_buf()
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
