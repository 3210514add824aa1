//! Error taxonomy for the dependency-graph pipeline.
//!
//! Every variant is terminal: nothing in this crate retries. The binary
//! logs the error with its [`Error::stage`] and exits non-zero.

use std::path::PathBuf;

/// Coarse classification of an [`Error`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigValidation,
    PathResolution,
    ExternalProcessFailure,
    ArtifactUnavailable,
    ExportFailure,
    NetworkError,
    SubmissionRejected,
}

/// File a [`Error::PathResolution`] was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathTarget {
    Gradlew,
    InitScript,
    Artifact,
}

impl PathTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathTarget::Gradlew => "gradlew",
            PathTarget::InitScript => "init script",
            PathTarget::Artifact => "artifact",
        }
    }
}

impl std::fmt::Display for PathTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while building or submitting a dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input is empty
    #[error("missing required input: {field}")]
    ConfigValidation { field: &'static str },

    /// A file the run depends on could not be resolved
    #[error("cannot resolve {target} at {}: {reason}", .path.display())]
    PathResolution {
        target: PathTarget,
        path: PathBuf,
        reason: String,
    },

    /// The build could not be started or exited non-zero
    #[error("{program} failed: {reason}")]
    ExternalProcessFailure {
        program: String,
        exit_code: Option<i32>,
        reason: String,
    },

    /// The graph file is missing, unreadable or empty
    #[error("dependency graph unavailable at {}: {reason}", .path.display())]
    ArtifactUnavailable { path: PathBuf, reason: String },

    /// The artifact path could not be handed to later steps
    #[error("failed to export {key}: {reason}")]
    ExportFailure { key: String, reason: String },

    /// Transport-level HTTP failure
    #[error("error contacting {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered without taking the snapshot
    #[error("graph submission rejected ({reason}), HTTP {status}. Received response: {body}")]
    SubmissionRejected {
        status: u16,
        reason: String,
        body: String,
    },
}

impl Error {
    /// Coarse classification, for matching without the payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigValidation { .. } => ErrorKind::ConfigValidation,
            Error::PathResolution { .. } => ErrorKind::PathResolution,
            Error::ExternalProcessFailure { .. } => ErrorKind::ExternalProcessFailure,
            Error::ArtifactUnavailable { .. } => ErrorKind::ArtifactUnavailable,
            Error::ExportFailure { .. } => ErrorKind::ExportFailure,
            Error::NetworkError { .. } => ErrorKind::NetworkError,
            Error::SubmissionRejected { .. } => ErrorKind::SubmissionRejected,
        }
    }

    /// Pipeline stage the error was raised in, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::ConfigValidation { .. } => "validate",
            Error::PathResolution {
                target: PathTarget::Artifact,
                ..
            } => "resolve_artifact",
            Error::PathResolution { .. } => "build_invocation",
            Error::ExternalProcessFailure { .. } => "invoke",
            Error::ArtifactUnavailable { .. } => "resolve_artifact",
            Error::ExportFailure { .. } => "export",
            Error::NetworkError { .. } => "submit",
            Error::SubmissionRejected { .. } => "interpret_response",
        }
    }

    /// Raw response body for rejected submissions.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Error::SubmissionRejected { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_display() {
        let err = Error::ConfigValidation {
            field: "github_token",
        };
        assert!(err.to_string().contains("github_token"));
        assert_eq!(err.kind(), ErrorKind::ConfigValidation);
        assert_eq!(err.stage(), "validate");
    }

    #[test]
    fn test_rejection_carries_body() {
        let err = Error::SubmissionRejected {
            status: 422,
            reason: "unexpected result \"INVALID\"".to_string(),
            body: r#"{"result":"INVALID"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains(r#"{"result":"INVALID"}"#));
        assert!(msg.contains("422"));
        assert_eq!(err.response_body(), Some(r#"{"result":"INVALID"}"#));
    }

    #[test]
    fn test_path_resolution_stage_depends_on_target() {
        let artifact = Error::PathResolution {
            target: PathTarget::Artifact,
            path: PathBuf::from("build/x.json"),
            reason: "no cwd".to_string(),
        };
        let init = Error::PathResolution {
            target: PathTarget::InitScript,
            path: PathBuf::from("graph-init-script.gradle"),
            reason: "not found".to_string(),
        };
        assert_eq!(artifact.stage(), "resolve_artifact");
        assert_eq!(init.stage(), "build_invocation");
        assert!(init.to_string().contains("init script"));
        assert!(artifact.response_body().is_none());
    }

    #[test]
    fn test_process_failure_display() {
        let err = Error::ExternalProcessFailure {
            program: "/work/gradlew".to_string(),
            exit_code: Some(1),
            reason: "exited with code 1".to_string(),
        };
        assert!(err.to_string().contains("/work/gradlew"));
        assert_eq!(err.kind(), ErrorKind::ExternalProcessFailure);
    }
}
