//! Interpretation of the snapshot API's acceptance response.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Decoded response. Only `result` is read; other keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SubmissionResult {
    #[serde(default)]
    pub result: Option<String>,
}

/// Outcome values the API uses for a snapshot it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    Accepted,
    Success,
}

impl SnapshotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotStatus::Accepted => "ACCEPTED",
            SnapshotStatus::Success => "SUCCESS",
        }
    }
}

impl std::fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether a response body means the snapshot was taken.
///
/// Anything other than a JSON object whose `result` is `"ACCEPTED"` or
/// `"SUCCESS"` is a `SubmissionRejected` carrying the raw body.
pub fn interpret_response(status: u16, body: &str) -> Result<SnapshotStatus> {
    let rejected = |reason: String| Error::SubmissionRejected {
        status,
        reason,
        body: body.to_string(),
    };

    let decoded: SubmissionResult = match serde_json::from_str(body) {
        Ok(decoded) => decoded,
        Err(e) => return Err(rejected(format!("failed to decode JSON response: {}", e))),
    };

    match decoded.result.as_deref() {
        Some("ACCEPTED") => Ok(SnapshotStatus::Accepted),
        Some("SUCCESS") => Ok(SnapshotStatus::Success),
        Some(other) => Err(rejected(format!("unexpected result {:?}", other))),
        None => Err(rejected("response has no \"result\" field".to_string())),
    }
}
