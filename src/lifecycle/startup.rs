//! Startup orchestration.
//!
//! Config first, then store and upstream client, then the pipeline. Any
//! failure here is fatal: the process does not serve with a partial setup.

use std::sync::Arc;
use thiserror::Error;

use crate::cache::{MemoryStore, StoreError};
use crate::config::ProxyConfig;
use crate::pipeline::Pipeline;
use crate::upstream::{HttpUpstream, UpstreamError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open cache store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Open the configured store and build the pipeline around it.
///
/// The store is returned alongside so the caller can run its flusher.
pub fn build_pipeline(config: &ProxyConfig) -> Result<(Pipeline, MemoryStore), StartupError> {
    let store = MemoryStore::open(&config.cache.location)?;
    let upstream = HttpUpstream::from_config(&config.upstream)?;

    tracing::info!(
        location = ?store.location(),
        entries = store.len(),
        allowed_domains = ?config.upstream.allowed_domains,
        "Cache store ready"
    );

    let pipeline = Pipeline::new(&config.upstream, Arc::new(store.clone()), Arc::new(upstream));
    Ok((pipeline, store))
}
