//! Maps an output directory to the Rust crate it belongs to.

use std::path::Path;

use serde::Deserialize;

use crate::error::GenerateError;

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Debug, Deserialize)]
struct ManifestPackage {
    name: String,
}

/// Crate name, as a path segment, of the nearest package enclosing `dir`.
///
/// Workspace-only manifests (no `[package]` table) are skipped.
pub fn crate_path_for_dir(dir: &Path) -> Result<String, GenerateError> {
    let canonical = dir.canonicalize().map_err(|e| {
        GenerateError::Config(format!("cannot resolve output directory {dir:?}: {e}"))
    })?;
    for ancestor in canonical.ancestors() {
        let manifest_path = ancestor.join("Cargo.toml");
        if !manifest_path.is_file() {
            continue;
        }
        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|e| GenerateError::io(&manifest_path, e))?;
        let manifest: Manifest = toml::from_str(&content).map_err(|e| {
            GenerateError::Config(format!("invalid manifest {manifest_path:?}: {e}"))
        })?;
        if let Some(package) = manifest.package {
            return Ok(package.name.replace('-', "_"));
        }
    }
    Err(GenerateError::Config(format!(
        "output directory {dir:?} is not inside a Cargo package"
    )))
}
