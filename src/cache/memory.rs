//! In-memory store with optional file persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::cache::key::CacheKey;
use crate::cache::store::{CacheStore, StoreError};
use crate::observability::metrics;

/// A thread-safe response store.
///
/// Entries live in a concurrent map. When a location is configured the map is
/// loaded from it on open and written back by [`MemoryStore::flush`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<CacheKey, String>>,
    location: Option<PathBuf>,
    dirty: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store, persisted to `location` if given.
    pub fn new(location: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            location,
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open the store for a configured location. An empty location means memory only.
    pub fn open(location: &str) -> Result<Self, StoreError> {
        if location.is_empty() {
            return Ok(Self::new(None));
        }
        Self::load_from_file(Path::new(location))
    }

    /// Load from file if it exists.
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<CacheKey, String> = serde_json::from_reader(reader)
                .map_err(|e| StoreError::Malformed(format!("{}: {}", path.display(), e)))?;
            for (k, v) in map {
                store.inner.insert(k, v);
            }
            tracing::info!(path = ?path, entries = store.inner.len(), "Loaded cache entries");
        }
        metrics::record_cache_size(store.inner.len());
        Ok(store)
    }

    /// Write all entries to the configured location, if there are unsaved changes.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.location else {
            return Ok(());
        };
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let map: HashMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let tmp = path.with_extension("tmp");
        let result = File::create(&tmp)
            .map_err(StoreError::from)
            .and_then(|file| serde_json::to_writer(BufWriter::new(file), &map).map_err(StoreError::from))
            .and_then(|_| fs::rename(&tmp, path).map_err(StoreError::from));

        if let Err(e) = result {
            self.dirty.store(true, Ordering::SeqCst);
            return Err(e);
        }
        tracing::debug!(path = ?path, entries = map.len(), "Flushed cache entries");
        Ok(())
    }

    /// Flush periodically until shutdown, then flush one last time.
    pub async fn run_flusher(self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        if self.location.is_none() {
            return;
        }

        let mut ticker = time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush_in_background().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cache flusher received shutdown signal");
                    break;
                }
            }
        }
        self.flush_in_background().await;
    }

    async fn flush_in_background(&self) {
        let store = self.clone();
        match tokio::task::spawn_blocking(move || store.flush()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to flush cache"),
            Err(e) => tracing::error!(error = %e, "Cache flush task failed"),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StoreError> {
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &CacheKey, body: String) -> Result<(), StoreError> {
        self.inner.insert(key.clone(), body);
        self.dirty.store(true, Ordering::SeqCst);
        metrics::record_cache_size(self.inner.len());
        Ok(())
    }
}
