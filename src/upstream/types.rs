//! Upstream response and error types.

use thiserror::Error;

/// A completed upstream round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// Errors that can occur while fetching from an upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Upstream answered with a 4xx/5xx status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// DNS, connect, timeout, reset or body decode failure.
    #[error("{0}")]
    Transport(String),
}

impl UpstreamError {
    /// Status code reported to the caller for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Transport(_) => 500,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Status { .. } => "status",
            UpstreamError::Transport(_) => "transport",
        }
    }
}
