//! Build, export and submit, in that order.

use crate::artifact::ArtifactLocation;
use crate::config::RunConfiguration;
use crate::error::Result;
use crate::export::{CommandExporter, OutputExporter};
use crate::invocation::InvocationSpec;
use crate::response::{interpret_response, SnapshotStatus};
use crate::runner::{BuildExecutor, ProcessBuildExecutor};
use crate::submit::{HttpSnapshotTransport, SnapshotTransport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Result of a run whose snapshot was taken.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Where the graph was written.
    pub artifact: ArtifactLocation,

    /// Artifact size in bytes.
    pub artifact_bytes: u64,

    /// Status reported by the API.
    pub status: SnapshotStatus,

    /// HTTP status of the submission response.
    pub http_status: u16,

    /// Time spent in the build, in milliseconds.
    pub build_duration_ms: u64,

    /// Time spent submitting, in milliseconds.
    pub submit_duration_ms: u64,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Linear submission pipeline. Every error ends the run; nothing is retried.
pub struct SubmissionPipeline {
    executor: Arc<dyn BuildExecutor>,
    exporter: Arc<dyn OutputExporter>,
    transport: Arc<dyn SnapshotTransport>,
}

impl SubmissionPipeline {
    pub fn new(
        executor: Arc<dyn BuildExecutor>,
        exporter: Arc<dyn OutputExporter>,
        transport: Arc<dyn SnapshotTransport>,
    ) -> Self {
        Self {
            executor,
            exporter,
            transport,
        }
    }

    /// Wire the production collaborators: a child Gradle process, the
    /// configured export command and the reqwest transport.
    pub fn from_config(config: &RunConfiguration) -> Result<Self> {
        let exporter = config
            .export
            .as_ref()
            .map(CommandExporter::from_settings)
            .unwrap_or_else(|| CommandExporter::new(Vec::new()));

        Ok(Self::new(
            Arc::new(ProcessBuildExecutor),
            Arc::new(exporter),
            Arc::new(HttpSnapshotTransport::from_config(config)?),
        ))
    }

    pub async fn run(&self, config: &RunConfiguration) -> Result<PipelineOutcome> {
        let start = Instant::now();

        config.validate()?;
        let spec = InvocationSpec::build(config)?;

        info!(
            owner = %config.owner,
            repo = %config.repo,
            correlator = config.job.as_ref().map(|j| j.correlator.as_str()),
            "Building gradle dependency graph"
        );

        let build_start = Instant::now();
        self.executor.run(&spec, &config.project_dir).await?;
        let build_duration_ms = build_start.elapsed().as_millis() as u64;

        let artifact = ArtifactLocation::resolve(config)?;
        let artifact_bytes = artifact.ensure_present()?;
        info!(path = %artifact, bytes = artifact_bytes, "Built dependency graph");

        match &config.export {
            Some(export) => {
                let value = artifact.path().to_string_lossy();
                self.exporter.export(&export.key, &value).await?;
            }
            None => warn!("Output export disabled, skipping"),
        }

        let submit_start = Instant::now();
        let response = self.transport.submit(&artifact).await?;
        let status = interpret_response(response.status, &response.body)?;
        let submit_duration_ms = submit_start.elapsed().as_millis() as u64;

        info!(
            result = %status,
            http_status = response.status,
            "Successfully uploaded dependency graph"
        );

        Ok(PipelineOutcome {
            artifact,
            artifact_bytes,
            status,
            http_status: response.status,
            build_duration_ms,
            submit_duration_ms,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
