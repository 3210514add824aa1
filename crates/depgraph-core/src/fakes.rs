//! In-memory fakes for the pipeline seams (testing only)
//!
//! Provides `FakeBuildExecutor`, `RecordingExporter` and `StaticTransport`
//! so the pipeline can run without Gradle, envman or the network.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::artifact::{ArtifactLocation, DEFAULT_ARTIFACT_NAME, REPORT_DIR};
use crate::error::{Error, Result};
use crate::export::OutputExporter;
use crate::invocation::{GraphProperty, InvocationSpec};
use crate::runner::BuildExecutor;
use crate::submit::{RawResponse, SnapshotTransport};

// ---------------------------------------------------------------------------
// FakeBuildExecutor
// ---------------------------------------------------------------------------

/// Stands in for Gradle plus the init script: records each invocation,
/// writes the configured artifact where the init script would, and exits
/// with the configured code.
#[derive(Debug)]
pub struct FakeBuildExecutor {
    exit_code: i32,
    artifact: Option<Vec<u8>>,
    invocations: Mutex<Vec<Vec<String>>>,
}

impl FakeBuildExecutor {
    pub fn new(exit_code: i32, artifact: Option<Vec<u8>>) -> Self {
        Self {
            exit_code,
            artifact,
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Argument vectors seen so far.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildExecutor for FakeBuildExecutor {
    async fn run(&self, spec: &InvocationSpec, working_dir: &Path) -> Result<()> {
        let argv = spec.as_slice().to_vec();
        self.invocations.lock().unwrap().push(argv);

        if self.exit_code != 0 {
            return Err(Error::ExternalProcessFailure {
                program: spec.program().to_string(),
                exit_code: Some(self.exit_code),
                reason: format!("exited with code {}", self.exit_code),
            });
        }

        if let Some(bytes) = &self.artifact {
            let file_name = spec
                .property(GraphProperty::JobCorrelator.name())
                .map(|c| format!("{}.json", c))
                .unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string());
            let path = working_dir.join(REPORT_DIR).join(file_name);
            let unavailable = |e: std::io::Error| Error::ArtifactUnavailable {
                path: path.clone(),
                reason: e.to_string(),
            };
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(unavailable)?;
            }
            std::fs::write(&path, bytes).map_err(unavailable)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingExporter
// ---------------------------------------------------------------------------

/// Exporter that keeps every key/value pair in memory.
#[derive(Debug, Default)]
pub struct RecordingExporter {
    exported: Mutex<Vec<(String, String)>>,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exported(&self) -> Vec<(String, String)> {
        self.exported.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutputExporter for RecordingExporter {
    async fn export(&self, key: &str, value: &str) -> Result<()> {
        let entry = (key.to_string(), value.to_string());
        self.exported.lock().unwrap().push(entry);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StaticTransport
// ---------------------------------------------------------------------------

/// Transport that reads the artifact like the real one does, records the
/// bytes and answers with a canned response.
#[derive(Debug)]
pub struct StaticTransport {
    response: RawResponse,
    submitted: Mutex<Vec<Vec<u8>>>,
}

impl StaticTransport {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            response: RawResponse {
                status,
                body: body.to_string(),
            },
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Bodies submitted so far.
    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotTransport for StaticTransport {
    async fn submit(&self, artifact: &ArtifactLocation) -> Result<RawResponse> {
        let path = artifact.path();
        let unavailable = |e: std::io::Error| Error::ArtifactUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        let bytes = tokio::fs::read(path).await.map_err(unavailable)?;
        self.submitted.lock().unwrap().push(bytes);
        Ok(self.response.clone())
    }
}
