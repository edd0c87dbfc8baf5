// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;

/// Project file as read from `mpbuild.toml`, before validation.
///
/// ```toml
/// [paths]
/// source = "src"
/// output = "dist"
/// manifest = "package.json"
///
/// [clean]
/// preserve = ["package.json", "node_modules", "miniprogram_npm"]
///
/// [tools]
/// script = "npx babel --filename {file}"
/// install = "npm install --production"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub clean: CleanSection,

    #[serde(default)]
    pub tools: ToolsSection,
}

/// Validated project file. Construct via `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub paths: PathsSection,
    pub clean: CleanSection,
    pub tools: ToolsSection,
}

impl ProjectConfig {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            clean: raw.clean,
            tools: raw.tools,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[paths]` section. Relative entries are resolved against the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Dependency manifest whose `dependencies` get installed into the output.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            manifest: default_manifest(),
        }
    }
}

/// `[clean]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CleanSection {
    /// Glob patterns (relative to the output root) that `clean` leaves alone.
    #[serde(default = "default_preserve")]
    pub preserve: Vec<String>,
}

fn default_preserve() -> Vec<String> {
    vec![
        "package.json".to_string(),
        "node_modules".to_string(),
        "miniprogram_npm".to_string(),
    ]
}

impl Default for CleanSection {
    fn default() -> Self {
        Self {
            preserve: default_preserve(),
        }
    }
}

/// `[tools]` section: shell commands for the external collaborators.
///
/// Transform commands read the source on stdin and write the result to
/// stdout. `{file}` is replaced with the source path. An empty transform
/// command copies the source through unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_script_cmd")]
    pub script: String,

    #[serde(default = "default_template_cmd")]
    pub template: String,

    #[serde(default = "default_style_cmd")]
    pub style: String,

    /// Run inside the output root after the derived manifest is written.
    #[serde(default = "default_install_cmd")]
    pub install: String,
}

fn default_script_cmd() -> String {
    "npx babel --filename {file}".to_string()
}

fn default_template_cmd() -> String {
    "npx pug --pretty".to_string()
}

fn default_style_cmd() -> String {
    "npx postcss --no-map".to_string()
}

fn default_install_cmd() -> String {
    "npm install --production".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            script: default_script_cmd(),
            template: default_template_cmd(),
            style: default_style_cmd(),
            install: default_install_cmd(),
        }
    }
}

/// Build-mode flags taken from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub is_development: bool,
    pub is_watch_enabled: bool,
}

/// Fully resolved, immutable build configuration.
///
/// Created once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub manifest_path: PathBuf,
    pub preserve: Vec<String>,
    pub is_development: bool,
    pub is_watch_enabled: bool,
}

impl BuildConfig {
    /// Resolve project paths against `project_root` and attach the CLI flags.
    pub fn resolve(project: &ProjectConfig, project_root: &Path, flags: BuildFlags) -> Result<Self> {
        let source_root = project_root.join(&project.paths.source);
        let output_root = project_root.join(&project.paths.output);
        crate::config::validate::validate_roots(&source_root, &output_root)?;

        Ok(Self {
            source_root,
            output_root,
            manifest_path: project_root.join(&project.paths.manifest),
            preserve: project.clean.preserve.clone(),
            is_development: flags.is_development,
            is_watch_enabled: flags.is_watch_enabled,
        })
    }

    /// Value exported as `NODE_ENV` to external tools.
    pub fn node_env(&self) -> &'static str {
        if self.is_development {
            "development"
        } else {
            "production"
        }
    }
}
