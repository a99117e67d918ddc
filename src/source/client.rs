//! HTTP and file access to the risk payload.

use super::error::SourceError;
use crate::config::ApiConfig;
use crate::models::RawPayload;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Response body of the health endpoint.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Client for the risk scoring API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    dashboard_path: String,
    health_path: String,
    timeout_seconds: u64,
}

impl ApiClient {
    /// Create a client with the configured timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                SourceError::unavailable(
                    &config.base_url,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self::with_client(http_client, config))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(http_client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dashboard_path: config.dashboard_path.clone(),
            health_path: config.health_path.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }

    /// Full URL of the dashboard endpoint.
    pub fn dashboard_url(&self) -> String {
        format!("{}{}", self.base_url, self.dashboard_path)
    }

    /// Full URL of the health endpoint.
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }

    /// Fetch and validate the dashboard payload.
    pub async fn fetch_dashboard(&self) -> Result<RawPayload, SourceError> {
        let url = self.dashboard_url();
        info!("Fetching dashboard payload from {}", url);

        let body = self.get_text(&url).await?;
        debug!("Received {} bytes", body.len());

        parse_payload(&url, &body)
    }

    /// Check that the API reports itself healthy.
    pub async fn health(&self) -> Result<(), SourceError> {
        let url = self.health_url();
        debug!("Checking API health at {}", url);

        let body = self.get_text(&url).await?;
        let health: HealthResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::malformed(&url, format!("Invalid health response: {}", e)))?;

        if health.status != "ok" {
            return Err(SourceError::unavailable(
                &url,
                format!("API reported status '{}'", health.status),
            ));
        }

        Ok(())
    }

    /// GET a URL and return the body of a successful response.
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::unavailable(
                    url,
                    format!("Request timed out after {}s", self.timeout_seconds),
                )
            } else if e.is_connect() {
                SourceError::unavailable(url, "Cannot connect. Is the risk API running?")
            } else {
                SourceError::unavailable(url, format!("Failed to send request: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::unavailable(
                url,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        response.text().await.map_err(|e| {
            SourceError::unavailable(url, format!("Failed to read response body: {}", e))
        })
    }
}

/// Decode a payload and reject non-finite scores.
pub fn parse_payload(origin: &str, body: &str) -> Result<RawPayload, SourceError> {
    let payload: RawPayload =
        serde_json::from_str(body).map_err(|e| SourceError::malformed(origin, e.to_string()))?;

    payload
        .validate()
        .map_err(|e| SourceError::malformed(origin, e.to_string()))?;

    Ok(payload)
}

/// Where a payload comes from.
#[derive(Debug, Clone)]
pub enum PayloadSource {
    /// The live dashboard endpoint.
    Api(ApiClient),
    /// A JSON file previously saved from the endpoint.
    File(PathBuf),
}

impl PayloadSource {
    /// Load the payload. Errors are terminal for the request.
    pub async fn load(&self) -> Result<RawPayload, SourceError> {
        match self {
            PayloadSource::Api(client) => client.fetch_dashboard().await,
            PayloadSource::File(path) => load_file(path).await,
        }
    }

    /// Human-readable origin, used in report metadata.
    pub fn describe(&self) -> String {
        match self {
            PayloadSource::Api(client) => client.dashboard_url(),
            PayloadSource::File(path) => path.display().to_string(),
        }
    }
}

async fn load_file(path: &Path) -> Result<RawPayload, SourceError> {
    info!("Reading payload from {}", path.display());

    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    parse_payload(&path.display().to_string(), &body)
}
