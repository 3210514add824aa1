//! depgraph-submit - Gradle dependency graph CI step
//!
//! Runs Gradle with the dependency-graph init script, exports the path of
//! the generated snapshot and submits it to GitHub's dependency submission
//! API. Every input can be given as a flag or through the step's
//! environment variable of the same name.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use depgraph_core::config::{DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_EXPORT_KEY};
use depgraph_core::{
    init_tracing, ColorMode, DependencyFilters, ExportSettings, JobCorrelation, RunConfiguration,
    SubmissionPipeline, SubmissionSettings,
};
use std::path::PathBuf;
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "depgraph-submit")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gradle dependency graph submission step", long_about = None)]
struct Cli {
    /// Path to the Gradle wrapper
    #[arg(long, env = "gradlew_path")]
    gradlew_path: PathBuf,

    /// GitHub token with contents:write on the repository
    #[arg(long, env = "github_token", hide_env_values = true)]
    github_token: String,

    /// Repository owner
    #[arg(long, env = "github_owner")]
    github_owner: String,

    /// Repository name
    #[arg(long, env = "github_repo")]
    github_repo: String,

    /// Job correlator; groups snapshots from the same logical job
    #[arg(long, env = "github_job_correlator", default_value = "")]
    github_job_correlator: String,

    /// Job id
    #[arg(long, env = "github_job_id", default_value = "")]
    github_job_id: String,

    /// Git ref the graph belongs to
    #[arg(long, env = "github_graph_ref", default_value = "")]
    github_graph_ref: String,

    /// Commit SHA the graph belongs to
    #[arg(long, env = "github_graph_sha", default_value = "")]
    github_graph_sha: String,

    /// Checkout directory reported to GitHub
    #[arg(long, env = "github_graph_workspace", default_value = "")]
    github_graph_workspace: String,

    #[arg(long, env = "included_projects", default_value = "")]
    included_projects: String,

    #[arg(long, env = "excluded_projects", default_value = "")]
    excluded_projects: String,

    #[arg(long, env = "included_configurations", default_value = "")]
    included_configurations: String,

    #[arg(long, env = "excluded_configurations", default_value = "")]
    excluded_configurations: String,

    #[arg(long, env = "runtime_included_projects", default_value = "")]
    runtime_included_projects: String,

    #[arg(long, env = "runtime_excluded_projects", default_value = "")]
    runtime_excluded_projects: String,

    #[arg(long, env = "runtime_included_configurations", default_value = "")]
    runtime_included_configurations: String,

    #[arg(long, env = "runtime_excluded_configurations", default_value = "")]
    runtime_excluded_configurations: String,

    /// Directory containing graph-init-script.gradle
    #[arg(long, env = "BITRISE_STEP_SOURCE_DIR", default_value = ".")]
    step_source_dir: PathBuf,

    /// Gradle project directory; the artifact is resolved against it
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// GitHub API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Value of the X-GitHub-Api-Version header
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Timeout for the submission request (client default if unset)
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Variable name the artifact path is exported under
    #[arg(long, default_value = DEFAULT_EXPORT_KEY)]
    export_key: String,

    /// Skip exporting the artifact path with envman
    #[arg(long)]
    no_export: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Colour log output
    #[arg(long, value_enum, default_value_t = Color::Auto)]
    color: Color,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Color {
    #[value(name = "auto")]
    Auto,
    #[value(name = "always")]
    Always,
    #[value(name = "never")]
    Never,
}

impl From<Color> for ColorMode {
    fn from(color: Color) -> Self {
        match color {
            Color::Auto => ColorMode::Auto,
            Color::Always => ColorMode::Always,
            Color::Never => ColorMode::Never,
        }
    }
}

impl Cli {
    fn job(&self) -> Option<JobCorrelation> {
        let job = JobCorrelation {
            correlator: self.github_job_correlator.clone(),
            job_id: self.github_job_id.clone(),
            git_ref: self.github_graph_ref.clone(),
            sha: self.github_graph_sha.clone(),
            workspace: self.github_graph_workspace.clone(),
        };
        (!job.is_empty()).then_some(job)
    }

    fn into_config(self) -> RunConfiguration {
        let job = self.job();
        let filters = DependencyFilters {
            included_projects: self.included_projects,
            excluded_projects: self.excluded_projects,
            included_configurations: self.included_configurations,
            excluded_configurations: self.excluded_configurations,
            runtime_included_projects: self.runtime_included_projects,
            runtime_excluded_projects: self.runtime_excluded_projects,
            runtime_included_configurations: self.runtime_included_configurations,
            runtime_excluded_configurations: self.runtime_excluded_configurations,
        };
        let submission = SubmissionSettings {
            api_url: self.api_url,
            api_version: self.api_version,
            timeout_secs: self.request_timeout_secs,
            ..Default::default()
        };
        let export = (!self.no_export).then(|| ExportSettings {
            key: self.export_key,
            ..Default::default()
        });

        let mut config = RunConfiguration::new(
            self.gradlew_path,
            self.github_token,
            self.github_owner,
            self.github_repo,
        )
        .with_step_source_dir(self.step_source_dir)
        .with_project_dir(self.project_dir)
        .with_filters(filters)
        .with_submission(submission)
        .with_export(export);
        if let Some(job) = job {
            config = config.with_job(job);
        }
        config
    }
}

async fn run(config: RunConfiguration) -> Result<()> {
    info!(
        "Step inputs:\n{}",
        serde_json::to_string_pretty(&config.to_log_json())?
    );

    let pipeline = SubmissionPipeline::from_config(&config)?;
    let outcome = pipeline.run(&config).await?;

    info!(
        artifact = %outcome.artifact,
        result = %outcome.status,
        build_ms = outcome.build_duration_ms,
        submit_ms = outcome.submit_duration_ms,
        total_ms = outcome.duration_ms,
        "Dependency graph submitted"
    );
    Ok(())
}

/// Log an error with its stage and, for rejections, the raw body.
fn report(err: &anyhow::Error) {
    let Some(e) = err.downcast_ref::<depgraph_core::Error>() else {
        error!("{:#}", err);
        return;
    };
    match e.response_body() {
        Some(body) => error!(
            stage = e.stage(),
            kind = ?e.kind(),
            body = %body,
            "Failed to submit graph to GitHub: {}",
            e
        ),
        None => error!(stage = e.stage(), kind = ?e.kind(), "{}", e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, cli.color.into(), level);

    let config = cli.into_config();
    if let Err(err) = run(config).await.context("dependency graph step failed") {
        report(&err);
        std::process::exit(1);
    }
}
