// src/tasks/install.rs

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::errors::{BuildError, Result};
use crate::fs::{read_json, write_text};
use crate::tasks::TaskContext;

/// File name of the derived manifest inside the output root.
pub const OUTPUT_MANIFEST: &str = "package.json";

/// Write the production manifest into the output root and run the installer.
///
/// Returns the path of the written manifest.
pub async fn install_dependencies(ctx: &TaskContext) -> Result<PathBuf> {
    let manifest = write_production_manifest(&ctx.config.manifest_path, &ctx.config.output_root).await?;
    ctx.toolchain.install(&manifest).await?;
    info!("install done");
    Ok(manifest)
}

/// `{"dependencies": ...}` with only the runtime dependencies of `manifest`.
///
/// A missing manifest or a missing/non-object `dependencies` field gives an
/// empty dependency map. Key order is preserved.
pub fn production_manifest(manifest: Option<&Value>) -> Value {
    let dependencies = manifest
        .and_then(|m| m.get("dependencies"))
        .filter(|deps| deps.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    json!({ "dependencies": dependencies })
}

/// Read `manifest_path`, derive the production manifest and write it
/// tab-indented to `<output_root>/package.json`.
pub async fn write_production_manifest(manifest_path: &Path, output_root: &Path) -> Result<PathBuf> {
    let manifest: Option<Value> = read_json(manifest_path).await;
    if manifest.is_none() {
        warn!(
            "no usable manifest at {}, installing no dependencies",
            manifest_path.display()
        );
    }

    let derived = production_manifest(manifest.as_ref());
    let text = to_tab_indented(&derived)?;

    let target = output_root.join(OUTPUT_MANIFEST);
    if write_text(&target, &text).await.is_none() {
        return Err(BuildError::IoError(io::Error::other(format!(
            "could not write {}",
            target.display()
        ))));
    }
    Ok(target)
}

fn to_tab_indented(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|err| BuildError::Other(err.into()))
}
