//! Locating compiled contract artifacts in a build output tree.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use alloy_core::primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// A compiled contract as produced by the external compiler toolchain.
///
/// Immutable once produced; the locator owns it until it is handed to the
/// publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Contract name from the artifact file.
    #[serde(rename = "contractName")]
    pub name: String,
    /// Structured interface description, kept opaque.
    pub abi: serde_json::Value,
    /// Deployment bytecode.
    pub bytecode: Bytes,
}

impl CompiledArtifact {
    /// Parse an artifact JSON file.
    pub fn from_file(path: &Path) -> Result<Self, DeployError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployError::ArtifactNotFound(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DeployError::ArtifactNotFound(format!("failed to parse {}: {e}", path.display()))
        })
    }
}

/// Find the most recently compiled artifact under `build_dir`.
///
/// Walks the tree recursively, considering `*.json` files but skipping the
/// compiler's `*.dbg.json` debug outputs, and returns the newest file that
/// parses as an artifact. Fails with [`DeployError::ArtifactNotFound`] when
/// no candidate exists.
pub fn locate_latest(build_dir: &Path) -> Result<CompiledArtifact, DeployError> {
    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    collect_artifacts(build_dir, &mut candidates).map_err(|e| {
        DeployError::ArtifactNotFound(format!(
            "failed to walk build tree {}: {e}",
            build_dir.display()
        ))
    })?;

    if candidates.is_empty() {
        return Err(DeployError::ArtifactNotFound(format!(
            "no artifact files under {}",
            build_dir.display()
        )));
    }

    // Newest first; files that do not parse as artifacts are skipped.
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, path) in &candidates {
        match CompiledArtifact::from_file(path) {
            Ok(artifact) => {
                tracing::info!(
                    contract = %artifact.name,
                    path = %path.display(),
                    "Located compiled artifact"
                );
                return Ok(artifact);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping non-artifact JSON");
            }
        }
    }

    Err(DeployError::ArtifactNotFound(format!(
        "no parseable artifact under {}",
        build_dir.display()
    )))
}

fn collect_artifacts(
    dir: &Path,
    out: &mut Vec<(SystemTime, PathBuf)>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_artifacts(&path, out)?;
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".json") || name.ends_with(".dbg.json") {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        out.push((modified, path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempdir::TempDir;

    fn write_artifact(dir: &Path, file: &str, contract: &str, bytecode: &str) {
        let content = serde_json::json!({
            "contractName": contract,
            "abi": [],
            "bytecode": bytecode,
        });
        std::fs::write(dir.join(file), content.to_string()).unwrap();
    }

    #[test]
    fn test_locate_picks_newest_artifact() {
        let tmp = TempDir::new("crossx-artifacts").unwrap();
        let nested = tmp.path().join("contracts/Token.sol");
        std::fs::create_dir_all(&nested).unwrap();

        write_artifact(tmp.path(), "Old.json", "Old", "0xaa");
        // Coarse mtime resolution on some filesystems.
        std::thread::sleep(Duration::from_millis(1100));
        write_artifact(&nested, "Token.json", "Token", "0xaabb");

        let artifact = locate_latest(tmp.path()).unwrap();
        assert_eq!(artifact.name, "Token");
        assert_eq!(artifact.bytecode, Bytes::from(vec![0xAA, 0xBB]));
    }

    #[test]
    fn test_locate_skips_debug_outputs() {
        let tmp = TempDir::new("crossx-artifacts").unwrap();
        write_artifact(tmp.path(), "Token.json", "Token", "0xaa");
        std::fs::write(tmp.path().join("Token.dbg.json"), "{}").unwrap();

        let artifact = locate_latest(tmp.path()).unwrap();
        assert_eq!(artifact.name, "Token");
    }

    #[test]
    fn test_locate_empty_tree() {
        let tmp = TempDir::new("crossx-artifacts").unwrap();
        let err = locate_latest(tmp.path()).unwrap_err();
        assert!(matches!(err, DeployError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_locate_missing_tree() {
        let err = locate_latest(Path::new("/nonexistent/build/tree")).unwrap_err();
        assert!(matches!(err, DeployError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_locate_skips_malformed_json() {
        let tmp = TempDir::new("crossx-artifacts").unwrap();
        write_artifact(tmp.path(), "Good.json", "Good", "0xaa");
        std::thread::sleep(Duration::from_millis(1100));
        std::fs::write(tmp.path().join("Newer.json"), "{ not json").unwrap();

        // The newer file is unparsable, so the older artifact wins.
        let artifact = locate_latest(tmp.path()).unwrap();
        assert_eq!(artifact.name, "Good");
    }
}
