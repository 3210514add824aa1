//! Gradle dependency-graph submission
//!
//! Turns a [`RunConfiguration`] into a Gradle invocation that writes a
//! dependency-graph snapshot, then submits that snapshot to GitHub's
//! dependency submission API:
//! - [`InvocationSpec`] builds the command line from the filters
//! - [`SubmissionPipeline`] runs the build, exports the artifact path and
//!   uploads the artifact
//! - [`interpret_response`] decides whether the snapshot was taken

pub mod artifact;
pub mod config;
pub mod error;
pub mod export;
pub mod fakes;
pub mod invocation;
pub mod pipeline;
pub mod response;
pub mod runner;
pub mod submit;
pub mod telemetry;

// Re-export key types
pub use artifact::ArtifactLocation;
pub use config::{
    DependencyFilters, ExportSettings, JobCorrelation, RunConfiguration, SubmissionSettings,
};
pub use error::{Error, ErrorKind, PathTarget, Result};
pub use export::{CommandExporter, OutputExporter};
pub use invocation::{GraphProperty, InvocationSpec};
pub use pipeline::{PipelineOutcome, SubmissionPipeline};
pub use response::{interpret_response, SnapshotStatus, SubmissionResult};
pub use runner::{BuildExecutor, ProcessBuildExecutor};
pub use submit::{HttpSnapshotTransport, RawResponse, SnapshotTransport};
pub use telemetry::{init_tracing, ColorMode};
