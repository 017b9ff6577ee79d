//! CSM queue status source
//!
//! Fetches the current deposit-queue status from the CSM API. Failures are
//! reported as a distinct `FetchError` so the monitor can fall back to the
//! last known sample instead of recording fabricated data.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::queue::SampleInput;

const QUEUE_STATUS_PATH: &str = "/api/v1/queue/status";

#[async_trait::async_trait]
pub trait QueueSource: Send + Sync {
    async fn fetch(&self) -> Result<SampleInput, FetchError>;
}

#[derive(Debug)]
pub enum FetchError {
    /// Connection, DNS or timeout failure
    Transport(reqwest::Error),
    /// Non-success HTTP status
    Status(StatusCode),
    /// Body was not a queue status document
    Decode(reqwest::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "queue status request failed: {}", e),
            Self::Status(s) => write!(f, "queue status returned HTTP {}", s),
            Self::Decode(e) => write!(f, "invalid queue status payload: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) | Self::Decode(e) => Some(e),
            Self::Status(_) => None,
        }
    }
}

/// HTTP client for the CSM API queue endpoint
pub struct CsmQueueClient {
    client: Client,
    status_url: String,
}

impl CsmQueueClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("csm-queue-monitor/0.1")
            .build()?;

        Ok(Self {
            client,
            status_url: format!("{}{}", endpoint.trim_end_matches('/'), QUEUE_STATUS_PATH),
        })
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

#[async_trait::async_trait]
impl QueueSource for CsmQueueClient {
    async fn fetch(&self) -> Result<SampleInput, FetchError> {
        debug!(url = %self.status_url, "Fetching queue status");

        let response = self
            .client
            .get(&self.status_url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json::<SampleInput>().await.map_err(FetchError::Decode)
    }
}
