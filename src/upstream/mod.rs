//! Upstream access subsystem.
//!
//! # Responsibilities
//! - GET upstream URLs with a fixed `accept: application/json` header
//! - Enforce the upstream timeout
//! - Separate HTTP-status failures from transport failures
//!
//! # Design Decisions
//! - 4xx/5xx surface as `UpstreamError::Status` so the caller can echo the code
//! - Timeouts, connection errors and invalid UTF-8 bodies are `Transport`
//! - No retries: a failed fetch is reported once

pub mod client;
pub mod types;

pub use client::{HttpUpstream, Upstream};
pub use types::{UpstreamError, UpstreamResponse};
