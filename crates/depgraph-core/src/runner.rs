//! Gradle process execution.

use crate::error::{Error, Result};
use crate::invocation::InvocationSpec;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs the build described by an [`InvocationSpec`].
#[async_trait]
pub trait BuildExecutor: Send + Sync {
    /// Run to completion. Any non-zero exit is an `ExternalProcessFailure`.
    async fn run(&self, spec: &InvocationSpec, working_dir: &Path) -> Result<()>;
}

/// Spawns the entry point as a child process with inherited stdio, so
/// build output streams live to the step log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessBuildExecutor;

#[async_trait]
impl BuildExecutor for ProcessBuildExecutor {
    async fn run(&self, spec: &InvocationSpec, working_dir: &Path) -> Result<()> {
        debug!(argv = ?spec.as_slice(), cwd = %working_dir.display(), "Spawning build");

        let status = Command::new(spec.program())
            .args(spec.args())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::ExternalProcessFailure {
                program: spec.program().to_string(),
                exit_code: None,
                reason: format!("could not start: {}", e),
            })?;

        if status.success() {
            info!(program = %spec.program(), "Build finished");
            return Ok(());
        }

        let exit_code = status.code();
        let reason = match exit_code {
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
        };
        Err(Error::ExternalProcessFailure {
            program: spec.program().to_string(),
            exit_code,
            reason,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::RunConfiguration;
    use crate::error::ErrorKind;
    use crate::invocation::INIT_SCRIPT_NAME;
    use std::os::unix::fs::PermissionsExt;

    fn spec_for(script: &str) -> (tempfile::TempDir, InvocationSpec) {
        let dir = tempfile::tempdir().unwrap();
        let gradlew = dir.path().join("gradlew");
        std::fs::write(&gradlew, script).unwrap();
        std::fs::set_permissions(&gradlew, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.path().join(INIT_SCRIPT_NAME), b"").unwrap();

        let config =
            RunConfiguration::new(&gradlew, "t", "o", "r").with_step_source_dir(dir.path());
        let spec = InvocationSpec::build(&config).unwrap();
        (dir, spec)
    }

    #[tokio::test]
    async fn test_successful_build() {
        let (dir, spec) = spec_for("#!/bin/sh\nexit 0\n");
        let result = ProcessBuildExecutor.run(&spec, dir.path()).await;
        result.expect("build should pass");
    }

    #[tokio::test]
    async fn test_failing_build_reports_exit_code() {
        let (dir, spec) = spec_for("#!/bin/sh\nexit 3\n");
        let result = ProcessBuildExecutor.run(&spec, dir.path()).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalProcessFailure);
        match err {
            Error::ExternalProcessFailure { exit_code, .. } => assert_eq!(exit_code, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_build_runs_in_working_dir() {
        let (dir, spec) = spec_for("#!/bin/sh\ntouch ran-here\n");
        ProcessBuildExecutor.run(&spec, dir.path()).await.unwrap();
        assert!(dir.path().join("ran-here").exists());
    }

    #[tokio::test]
    async fn test_unspawnable_entry_point() {
        // Not executable.
        let (dir, spec) = spec_for("#!/bin/sh\nexit 0\n");
        std::fs::set_permissions(
            dir.path().join("gradlew"),
            std::fs::Permissions::from_mode(0o644),
        )
        .unwrap();
        let result = ProcessBuildExecutor.run(&spec, dir.path()).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("could not start"));
    }
}
