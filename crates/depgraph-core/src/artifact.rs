//! Location of the dependency-graph JSON written by the init script.
//!
//! The path is a convention shared with the init script; nothing here
//! scans the build directory.

use crate::config::RunConfiguration;
use crate::error::{Error, PathTarget, Result};
use std::path::{Path, PathBuf};

/// Report directory relative to the project root.
pub const REPORT_DIR: &str = "build/reports/dependency-graph-snapshots";

/// File name used when no job correlator is configured.
pub const DEFAULT_ARTIFACT_NAME: &str = "dependency-graph.json";

/// Absolute path of the generated graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    path: PathBuf,
}

impl ArtifactLocation {
    /// Compute the artifact path for `config`.
    ///
    /// Does not touch the file; call [`ArtifactLocation::ensure_present`]
    /// once the build has run.
    pub fn resolve(config: &RunConfiguration) -> Result<Self> {
        let file_name = match &config.job {
            Some(job) => format!("{}.json", job.correlator),
            None => DEFAULT_ARTIFACT_NAME.to_string(),
        };
        let relative = config.project_dir.join(REPORT_DIR).join(file_name);
        let path = std::path::absolute(&relative).map_err(|e| Error::PathResolution {
            target: PathTarget::Artifact,
            path: relative.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { path })
    }

    /// Require the artifact to exist and be non-empty. Returns its size.
    pub fn ensure_present(&self) -> Result<u64> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| Error::ArtifactUnavailable {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(Error::ArtifactUnavailable {
                path: self.path.clone(),
                reason: "not a regular file".to_string(),
            });
        }
        if metadata.len() == 0 {
            return Err(Error::ArtifactUnavailable {
                path: self.path.clone(),
                reason: "file is empty".to_string(),
            });
        }
        Ok(metadata.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
