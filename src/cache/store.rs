//! Key-value store contract used by the pipeline.

use async_trait::async_trait;
use thiserror::Error;

use crate::cache::key::CacheKey;

/// Errors surfaced by a cache store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Persisted entries could not be decoded.
    #[error("malformed store contents: {0}")]
    Malformed(String),

    /// Store refused the write.
    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A get/put store of response bodies keyed by [`CacheKey`].
///
/// Callers treat every error as soft: a failed `get` is a miss and a failed
/// `put` is logged and dropped.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the body stored under `key`, if any.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StoreError>;

    /// Store `body` under `key`, replacing any previous entry.
    async fn put(&self, key: &CacheKey, body: String) -> Result<(), StoreError>;
}
