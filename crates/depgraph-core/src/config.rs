//! Run configuration for a single dependency-graph submission.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;

/// Default GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// API version pinned in the `X-GitHub-Api-Version` header.
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Variable name the artifact path is exported under.
pub const DEFAULT_EXPORT_KEY: &str = "GITHUB_DEPENDENCY_GRAPH";

/// Optional Gradle filters. Values are passed through verbatim; the
/// comma convention for lists belongs to the init script.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyFilters {
    pub included_projects: String,
    pub excluded_projects: String,
    pub included_configurations: String,
    pub excluded_configurations: String,
    pub runtime_included_projects: String,
    pub runtime_excluded_projects: String,
    pub runtime_included_configurations: String,
    pub runtime_excluded_configurations: String,
}

/// Identifiers linking a snapshot to a GitHub job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobCorrelation {
    pub correlator: String,
    pub job_id: String,
    pub git_ref: String,
    pub sha: String,
    pub workspace: String,
}

impl JobCorrelation {
    /// True when none of the correlation inputs was given.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> Result<()> {
        require("github_job_correlator", &self.correlator)?;
        require("github_job_id", &self.job_id)?;
        require("github_graph_ref", &self.git_ref)?;
        require("github_graph_sha", &self.sha)?;
        require("github_graph_workspace", &self.workspace)
    }
}

/// HTTP settings for the snapshot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionSettings {
    pub api_url: String,
    pub api_version: String,
    /// Request timeout in seconds; `None` keeps the client default.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: None,
            user_agent: concat!("depgraph-submit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// How the artifact path is handed to later CI steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportSettings {
    pub key: String,
    /// Command prefix; `--key <key> --value <path>` is appended.
    pub command: Vec<String>,
}

impl ExportSettings {
    /// `bitrise envman add`, run through the Bitrise CLI.
    pub fn default_command() -> Vec<String> {
        ["bitrise", "envman", "add"].map(String::from).to_vec()
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            key: DEFAULT_EXPORT_KEY.to_string(),
            command: Self::default_command(),
        }
    }
}

/// Everything one run needs. Built once, then only borrowed.
#[derive(Clone)]
pub struct RunConfiguration {
    pub gradlew_path: PathBuf,
    /// Directory holding `graph-init-script.gradle`.
    pub step_source_dir: PathBuf,
    /// Directory the artifact path is resolved against.
    pub project_dir: PathBuf,
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub filters: DependencyFilters,
    pub job: Option<JobCorrelation>,
    pub submission: SubmissionSettings,
    pub export: Option<ExportSettings>,
}

impl RunConfiguration {
    /// Create a minimal configuration with no filters and no job correlation.
    pub fn new(
        gradlew_path: impl Into<PathBuf>,
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            gradlew_path: gradlew_path.into(),
            step_source_dir: PathBuf::from("."),
            project_dir: PathBuf::from("."),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            filters: DependencyFilters::default(),
            job: None,
            submission: SubmissionSettings::default(),
            export: Some(ExportSettings::default()),
        }
    }

    pub fn with_step_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.step_source_dir = dir.into();
        self
    }

    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    pub fn with_filters(mut self, filters: DependencyFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_job(mut self, job: JobCorrelation) -> Self {
        self.job = Some(job);
        self
    }

    pub fn with_submission(mut self, submission: SubmissionSettings) -> Self {
        self.submission = submission;
        self
    }

    pub fn with_export(mut self, export: Option<ExportSettings>) -> Self {
        self.export = export;
        self
    }

    /// Check that every required input is non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.gradlew_path.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                field: "gradlew_path",
            });
        }
        require("github_token", &self.token)?;
        require("github_owner", &self.owner)?;
        require("github_repo", &self.repo)?;
        if let Some(job) = &self.job {
            job.validate()?;
        }
        if let Some(export) = &self.export {
            require("export_key", &export.key)?;
            if export.command.is_empty() {
                return Err(Error::ConfigValidation {
                    field: "export_command",
                });
            }
        }
        Ok(())
    }

    /// Loggable view of the configuration with the token left out.
    pub fn to_log_json(&self) -> serde_json::Value {
        json!({
            "gradlew_path": self.gradlew_path.display().to_string(),
            "step_source_dir": self.step_source_dir.display().to_string(),
            "project_dir": self.project_dir.display().to_string(),
            "owner": &self.owner,
            "repo": &self.repo,
            "filters": &self.filters,
            "job": &self.job,
            "submission": &self.submission,
            "export": &self.export,
        })
    }
}

impl std::fmt::Debug for RunConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfiguration")
            .field("gradlew_path", &self.gradlew_path)
            .field("step_source_dir", &self.step_source_dir)
            .field("project_dir", &self.project_dir)
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("filters", &self.filters)
            .field("job", &self.job)
            .field("submission", &self.submission)
            .field("export", &self.export)
            .finish()
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::ConfigValidation { field })
    } else {
        Ok(())
    }
}
