//! Upstream HTTP client.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::upstream::types::{UpstreamError, UpstreamResponse};

/// Fetches a URL from an upstream API.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue a GET for `url` with `accept: application/json`.
    async fn fetch(&self, url: &str) -> Result<UpstreamResponse, UpstreamError>;
}

/// [`Upstream`] backed by a pooled reqwest client with a bounded timeout.
#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Create a client from upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Self::with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, url: &str) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if let Err(e) = response.error_for_status_ref() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| UpstreamError::Transport(format!("response body is not valid UTF-8: {}", e)))?;

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}
