//! Integration tests for the pipeline with a scripted Gradle wrapper.

#![cfg(unix)]

use depgraph_core::fakes::{RecordingExporter, StaticTransport};
use depgraph_core::invocation::INIT_SCRIPT_NAME;
use depgraph_core::{
    DependencyFilters, ErrorKind, JobCorrelation, ProcessBuildExecutor, RunConfiguration,
    SnapshotStatus, SubmissionPipeline,
};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

/// Records its arguments and writes the graph where the init script would.
const FAKE_GRADLEW: &str = r#"#!/bin/sh
name=dependency-graph
for arg in "$@"; do
  printf '%s\n' "$arg" >> args.txt
  case "$arg" in
    -DGITHUB_DEPENDENCY_GRAPH_JOB_CORRELATOR=*) name="${arg#*=}" ;;
  esac
done
out=build/reports/dependency-graph-snapshots
mkdir -p "$out"
printf '{"version":0,"job":{"correlator":"%s"}}' "$name" > "$out/$name.json"
"#;

fn install_gradlew(dir: &Path, script: &str) {
    let gradlew = dir.join("gradlew");
    std::fs::write(&gradlew, script).unwrap();
    std::fs::set_permissions(&gradlew, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(dir.join(INIT_SCRIPT_NAME), b"// init script\n").unwrap();
}

fn config(dir: &Path) -> RunConfiguration {
    RunConfiguration::new(dir.join("gradlew"), "ghp_test", "octo", "app")
        .with_step_source_dir(dir)
        .with_project_dir(dir)
}

fn recorded_args(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Test: scripted build with job correlation is submitted end to end
#[tokio::test]
async fn test_correlated_run_submits_artifact() {
    let dir = tempfile::tempdir().unwrap();
    install_gradlew(dir.path(), FAKE_GRADLEW);

    let exporter = Arc::new(RecordingExporter::new());
    let transport = Arc::new(StaticTransport::new(201, r#"{"id":1,"result":"SUCCESS"}"#));
    let pipeline = SubmissionPipeline::new(
        Arc::new(ProcessBuildExecutor),
        exporter.clone(),
        transport.clone(),
    );

    let config = config(dir.path())
        .with_filters(DependencyFilters {
            included_projects: "app,lib".to_string(),
            ..Default::default()
        })
        .with_job(JobCorrelation {
            correlator: "android-deps".to_string(),
            job_id: "99".to_string(),
            git_ref: "refs/heads/main".to_string(),
            sha: "0123abcd".to_string(),
            workspace: dir.path().to_string_lossy().into_owned(),
        });

    let outcome = pipeline.run(&config).await.expect("pipeline failed");

    assert_eq!(outcome.status, SnapshotStatus::Success);
    assert!(outcome
        .artifact
        .path()
        .ends_with("build/reports/dependency-graph-snapshots/android-deps.json"));

    let args = recorded_args(dir.path());
    assert_eq!(args[0], "-I");
    assert!(args[1].ends_with(INIT_SCRIPT_NAME));
    let has = |flag: &str| args.iter().any(|a| a == flag);
    assert!(has("-DDEPENDENCY_GRAPH_INCLUDE_PROJECTS=app,lib"));
    assert!(has("-DGITHUB_DEPENDENCY_GRAPH_JOB_ID=99"));
    assert!(!args.iter().any(|a| a.contains("_EXCLUDE_")));

    let exported = exporter.exported();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].0, "GITHUB_DEPENDENCY_GRAPH");
    assert_eq!(Path::new(&exported[0].1), outcome.artifact.path());

    let expected = br#"{"version":0,"job":{"correlator":"android-deps"}}"#;
    assert_eq!(transport.submitted(), vec![expected.to_vec()]);
}

/// Test: minimal variant writes and submits the fixed file name
#[tokio::test]
async fn test_minimal_run_uses_fixed_artifact_name() {
    let dir = tempfile::tempdir().unwrap();
    install_gradlew(dir.path(), FAKE_GRADLEW);

    let transport = Arc::new(StaticTransport::new(201, r#"{"result":"ACCEPTED"}"#));
    let pipeline = SubmissionPipeline::new(
        Arc::new(ProcessBuildExecutor),
        Arc::new(RecordingExporter::new()),
        transport.clone(),
    );

    let config = config(dir.path());
    let outcome = pipeline.run(&config).await.expect("pipeline failed");
    assert_eq!(outcome.status, SnapshotStatus::Accepted);
    assert!(outcome.artifact.path().ends_with("dependency-graph.json"));
    assert!(!recorded_args(dir.path())
        .iter()
        .any(|a| a.starts_with("-DGITHUB_DEPENDENCY_GRAPH_")));
    assert_eq!(transport.submitted().len(), 1);
}

/// Test: a failing build stops before artifact resolution and submission
#[tokio::test]
async fn test_failed_build_never_submits() {
    let dir = tempfile::tempdir().unwrap();
    install_gradlew(dir.path(), "#!/bin/sh\necho 'BUILD FAILED' >&2\nexit 1\n");

    let exporter = Arc::new(RecordingExporter::new());
    let transport = Arc::new(StaticTransport::new(201, r#"{"result":"SUCCESS"}"#));
    let pipeline = SubmissionPipeline::new(
        Arc::new(ProcessBuildExecutor),
        exporter.clone(),
        transport.clone(),
    );

    let err = pipeline.run(&config(dir.path())).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalProcessFailure);
    assert_eq!(err.stage(), "invoke");
    assert!(exporter.exported().is_empty());
    assert!(transport.submitted().is_empty());
    assert!(!dir.path().join("build").exists());
}

/// Test: a build that succeeds without writing the graph is reported as such
#[tokio::test]
async fn test_build_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    install_gradlew(dir.path(), "#!/bin/sh\nexit 0\n");

    let transport = Arc::new(StaticTransport::new(201, r#"{"result":"SUCCESS"}"#));
    let pipeline = SubmissionPipeline::new(
        Arc::new(ProcessBuildExecutor),
        Arc::new(RecordingExporter::new()),
        transport.clone(),
    );

    let err = pipeline.run(&config(dir.path())).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArtifactUnavailable);
    assert!(transport.submitted().is_empty());
}

/// Test: missing init script is a path resolution error before any build
#[tokio::test]
async fn test_missing_init_script() {
    let dir = tempfile::tempdir().unwrap();
    install_gradlew(dir.path(), FAKE_GRADLEW);
    std::fs::remove_file(dir.path().join(INIT_SCRIPT_NAME)).unwrap();

    let pipeline = SubmissionPipeline::new(
        Arc::new(ProcessBuildExecutor),
        Arc::new(RecordingExporter::new()),
        Arc::new(StaticTransport::new(201, r#"{"result":"SUCCESS"}"#)),
    );

    let err = pipeline.run(&config(dir.path())).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathResolution);
    assert!(!dir.path().join("args.txt").exists());
}
