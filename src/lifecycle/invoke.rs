//! Single-shot invocation: one request descriptor in, one response descriptor out.
//!
//! The store is opened, used for one request and flushed. A failed flush is
//! logged and never replaces the response.

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::lifecycle::startup::{build_pipeline, StartupError};
use crate::pipeline::{ProxyRequest, ProxyResponse};

/// Errors that prevent an invocation from producing a response.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("invalid request descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error(transparent)]
    Startup(#[from] StartupError),
}

/// Handle the JSON request descriptor `event` and return the response descriptor.
pub async fn invoke(config: &ProxyConfig, event: &str) -> Result<ProxyResponse, InvokeError> {
    let request: ProxyRequest = serde_json::from_str(event)?;

    let (pipeline, store) = build_pipeline(config)?;
    let response = pipeline.handle(request).await;

    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush cache");
    }
    Ok(response)
}
