//! Upload of the artifact to the dependency submission API.

use crate::artifact::ArtifactLocation;
use crate::config::{RunConfiguration, SubmissionSettings};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, info};

pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.github+json";
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Status and body of a response, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Sends an artifact to the snapshot endpoint.
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    /// Stream the artifact bytes as the request body and return the raw
    /// response. Opening the file is part of the attempt.
    async fn submit(&self, artifact: &ArtifactLocation) -> Result<RawResponse>;
}

/// `POST {api}/repos/{owner}/{repo}/dependency-graph/snapshots`.
pub fn snapshots_url(api_url: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/{}/dependency-graph/snapshots",
        api_url.trim_end_matches('/'),
        owner,
        repo
    )
}

/// reqwest-backed transport.
pub struct HttpSnapshotTransport {
    client: reqwest::Client,
    url: String,
    api_version: String,
    token: String,
}

impl HttpSnapshotTransport {
    pub fn new(
        settings: &SubmissionSettings,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Self> {
        let url = snapshots_url(&settings.api_url, owner, repo);

        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.as_str());
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|source| Error::NetworkError {
            url: url.clone(),
            source,
        })?;

        Ok(Self {
            client,
            url,
            api_version: settings.api_version.clone(),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &RunConfiguration) -> Result<Self> {
        let (owner, repo) = (config.owner.as_str(), config.repo.as_str());
        Self::new(&config.submission, &config.token, owner, repo)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SnapshotTransport for HttpSnapshotTransport {
    async fn submit(&self, artifact: &ArtifactLocation) -> Result<RawResponse> {
        let unavailable = |e: std::io::Error| Error::ArtifactUnavailable {
            path: artifact.path().to_path_buf(),
            reason: e.to_string(),
        };
        let network = |source: reqwest::Error| Error::NetworkError {
            url: self.url.clone(),
            source,
        };

        // The handle moves into the body and is dropped with the request.
        let path = artifact.path();
        let file = tokio::fs::File::open(path).await.map_err(unavailable)?;
        let len = file.metadata().await.map_err(unavailable)?.len();

        info!(url = %self.url, bytes = len, "Submitting dependency graph");

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, ACCEPT_MEDIA_TYPE)
            .header(API_VERSION_HEADER, &self.api_version)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, len)
            .bearer_auth(&self.token)
            .body(reqwest::Body::from(file))
            .send()
            .await
            .map_err(network)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(network)?;
        debug!(status, body = %body, "Snapshot API responded");

        Ok(RawResponse { status, body })
    }
}
