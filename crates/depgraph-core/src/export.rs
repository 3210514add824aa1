//! Hand-off of the artifact path to later CI steps.

use crate::config::ExportSettings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Registers a key/value pair with the CI platform.
#[async_trait]
pub trait OutputExporter: Send + Sync {
    async fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// Exports by running `<command...> --key <key> --value <value>`
/// (`envman add` by default).
#[derive(Debug, Clone)]
pub struct CommandExporter {
    command: Vec<String>,
}

impl CommandExporter {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self::new(settings.command.clone())
    }
}

#[async_trait]
impl OutputExporter for CommandExporter {
    async fn export(&self, key: &str, value: &str) -> Result<()> {
        let failure = |reason: String| Error::ExportFailure {
            key: key.to_string(),
            reason,
        };

        let (program, prefix) = self
            .command
            .split_first()
            .ok_or_else(|| failure("export command is empty".to_string()))?;

        let status = Command::new(program)
            .args(prefix)
            .args(["--key", key, "--value", value])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| failure(format!("could not start {}: {}", program, e)))?;

        if !status.success() {
            return Err(failure(format!("{} exited with {}", program, status)));
        }

        info!(key = %key, value = %value, "Exported output");
        Ok(())
    }
}
