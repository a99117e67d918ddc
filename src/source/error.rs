//! Errors raised while retrieving a risk payload.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a payload the aggregator can consume.
///
/// Every variant is terminal for the request: the aggregator never runs
/// on a payload that produced one of these.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The risk API could not be reached or answered with a non-success status.
    #[error("Risk API unavailable at {url}: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    /// The payload arrived but could not be decoded or holds invalid scores.
    #[error("Malformed payload from {origin}: {reason}")]
    MalformedPayload { origin: String, reason: String },

    /// A local payload file could not be read.
    #[error("Failed to read payload file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub(crate) fn unavailable(url: &str, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(origin: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            origin: origin.to_string(),
            reason: reason.into(),
        }
    }
}
