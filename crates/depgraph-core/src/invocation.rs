//! Translation of a [`RunConfiguration`] into a Gradle command line.

use crate::config::RunConfiguration;
use crate::error::{Error, PathTarget, Result};
use std::path::{Path, PathBuf};

/// Init script shipped alongside the step.
pub const INIT_SCRIPT_NAME: &str = "graph-init-script.gradle";

/// Task registered by the init script.
pub const RESOLVE_TASK: &str = ":ForceDependencyResolutionPlugin_resolveAllDependencies";

/// Flags required for a complete, uncached resolution.
pub const FIXED_FLAGS: [&str; 3] = [
    "--dependency-verification=off",
    "--no-configuration-cache",
    "--no-configure-on-demand",
];

/// System properties understood by the init script, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphProperty {
    IncludeProjects,
    ExcludeProjects,
    IncludeConfigurations,
    ExcludeConfigurations,
    RuntimeIncludeProjects,
    RuntimeExcludeProjects,
    RuntimeIncludeConfigurations,
    RuntimeExcludeConfigurations,
    JobCorrelator,
    JobId,
    Ref,
    Sha,
    Workspace,
}

impl GraphProperty {
    pub const ALL: [GraphProperty; 13] = [
        GraphProperty::IncludeProjects,
        GraphProperty::ExcludeProjects,
        GraphProperty::IncludeConfigurations,
        GraphProperty::ExcludeConfigurations,
        GraphProperty::RuntimeIncludeProjects,
        GraphProperty::RuntimeExcludeProjects,
        GraphProperty::RuntimeIncludeConfigurations,
        GraphProperty::RuntimeExcludeConfigurations,
        GraphProperty::JobCorrelator,
        GraphProperty::JobId,
        GraphProperty::Ref,
        GraphProperty::Sha,
        GraphProperty::Workspace,
    ];

    /// Property name as passed after `-D`.
    pub fn name(&self) -> &'static str {
        match self {
            GraphProperty::IncludeProjects => "DEPENDENCY_GRAPH_INCLUDE_PROJECTS",
            GraphProperty::ExcludeProjects => "DEPENDENCY_GRAPH_EXCLUDE_PROJECTS",
            GraphProperty::IncludeConfigurations => "DEPENDENCY_GRAPH_INCLUDE_CONFIGURATIONS",
            GraphProperty::ExcludeConfigurations => "DEPENDENCY_GRAPH_EXCLUDE_CONFIGURATIONS",
            GraphProperty::RuntimeIncludeProjects => "DEPENDENCY_GRAPH_RUNTIME_INCLUDE_PROJECTS",
            GraphProperty::RuntimeExcludeProjects => "DEPENDENCY_GRAPH_RUNTIME_EXCLUDE_PROJECTS",
            GraphProperty::RuntimeIncludeConfigurations => {
                "DEPENDENCY_GRAPH_RUNTIME_INCLUDE_CONFIGURATIONS"
            }
            GraphProperty::RuntimeExcludeConfigurations => {
                "DEPENDENCY_GRAPH_RUNTIME_EXCLUDE_CONFIGURATIONS"
            }
            GraphProperty::JobCorrelator => "GITHUB_DEPENDENCY_GRAPH_JOB_CORRELATOR",
            GraphProperty::JobId => "GITHUB_DEPENDENCY_GRAPH_JOB_ID",
            GraphProperty::Ref => "GITHUB_DEPENDENCY_GRAPH_REF",
            GraphProperty::Sha => "GITHUB_DEPENDENCY_GRAPH_SHA",
            GraphProperty::Workspace => "GITHUB_DEPENDENCY_GRAPH_WORKSPACE",
        }
    }

    /// Source value for this property. Each property reads its own field.
    pub fn value<'a>(&self, config: &'a RunConfiguration) -> &'a str {
        let filters = &config.filters;
        let job = config.job.as_ref();
        match self {
            GraphProperty::IncludeProjects => &filters.included_projects,
            GraphProperty::ExcludeProjects => &filters.excluded_projects,
            GraphProperty::IncludeConfigurations => &filters.included_configurations,
            GraphProperty::ExcludeConfigurations => &filters.excluded_configurations,
            GraphProperty::RuntimeIncludeProjects => &filters.runtime_included_projects,
            GraphProperty::RuntimeExcludeProjects => &filters.runtime_excluded_projects,
            GraphProperty::RuntimeIncludeConfigurations => &filters.runtime_included_configurations,
            GraphProperty::RuntimeExcludeConfigurations => &filters.runtime_excluded_configurations,
            GraphProperty::JobCorrelator => job.map_or("", |j| j.correlator.as_str()),
            GraphProperty::JobId => job.map_or("", |j| j.job_id.as_str()),
            GraphProperty::Ref => job.map_or("", |j| j.git_ref.as_str()),
            GraphProperty::Sha => job.map_or("", |j| j.sha.as_str()),
            GraphProperty::Workspace => job.map_or("", |j| j.workspace.as_str()),
        }
    }

    /// `-D<NAME>=<value>`, or `None` when the source field is empty.
    pub fn flag(&self, config: &RunConfiguration) -> Option<String> {
        let value = self.value(config);
        if value.is_empty() {
            None
        } else {
            Some(format!("-D{}={}", self.name(), value))
        }
    }
}

/// Ordered Gradle argument list. The first element is the entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    argv: Vec<String>,
}

impl InvocationSpec {
    /// Build the invocation for `config`.
    ///
    /// Both the entry point and the init script must exist; either
    /// missing is a `PathResolution` error.
    pub fn build(config: &RunConfiguration) -> Result<Self> {
        let gradlew = resolve_existing(PathTarget::Gradlew, &config.gradlew_path)?;
        let init_path = config.step_source_dir.join(INIT_SCRIPT_NAME);
        let init_script = resolve_existing(PathTarget::InitScript, &init_path)?;

        let mut argv = vec![
            path_arg(&gradlew),
            "-I".to_string(),
            path_arg(&init_script),
        ];
        argv.extend(FIXED_FLAGS.iter().map(|f| f.to_string()));
        argv.push(RESOLVE_TASK.to_string());
        argv.extend(GraphProperty::ALL.iter().filter_map(|p| p.flag(config)));

        Ok(Self { argv })
    }

    /// Executable to spawn.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments following the executable.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.argv
    }

    /// Value of the `-D<name>=` flag, if present.
    pub fn property(&self, name: &str) -> Option<&str> {
        let prefix = format!("-D{}=", name);
        self.argv.iter().find_map(|a| a.strip_prefix(&prefix))
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Make `path` absolute and require it to be an existing file.
fn resolve_existing(target: PathTarget, path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::PathResolution {
        target,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !absolute.is_file() {
        return Err(Error::PathResolution {
            target,
            path: absolute,
            reason: "no such file".to_string(),
        });
    }
    Ok(absolute)
}
