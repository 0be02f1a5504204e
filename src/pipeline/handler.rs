//! The request/response cycle.

use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheKey, CacheStore};
use crate::classifier::Classifier;
use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::pipeline::request::ProxyRequest;
use crate::pipeline::response::ProxyResponse;
use crate::upstream::{Upstream, UpstreamResponse};

/// Message returned when a request targets a domain outside the allowlist.
pub const DOMAIN_NOT_ALLOWED: &str = "Domain not allowed";

/// Classifies, looks up, fetches and stores one request at a time.
///
/// Holds no per-request state; one instance serves concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    classifier: Arc<Classifier>,
    store: Arc<dyn CacheStore>,
    upstream: Arc<dyn Upstream>,
    scheme: String,
}

impl Pipeline {
    pub fn new(
        config: &UpstreamConfig,
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        Self {
            classifier: Arc::new(Classifier::from_config(config)),
            store,
            upstream,
            scheme: config.scheme.clone(),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Handle one request. Never fails: every outcome is a response.
    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        let start = Instant::now();
        let response = self.dispatch(&request).await;
        metrics::record_request(
            response.status_code,
            response.cache_status().map_or("none", |s| s.as_str()),
            start,
        );
        response
    }

    async fn dispatch(&self, request: &ProxyRequest) -> ProxyResponse {
        let path = request.raw_path.as_str();

        if !self.classifier.is_allowed_domain(path) {
            tracing::warn!(path = %path, "Domain not allowed");
            return ProxyResponse::error(403, DOMAIN_NOT_ALLOWED);
        }

        let full_path = request.full_path();
        let cache_key = self
            .classifier
            .is_cacheable_path(path)
            .then(|| CacheKey::derive(&full_path));

        if let Some(key) = &cache_key {
            if let Some(body) = self.lookup(path, key).await {
                return ProxyResponse::hit(body);
            }
        }

        let url = request.upstream_url(&self.scheme);
        tracing::debug!(path = %path, url = %url, "Fetching from upstream");

        let UpstreamResponse { status, body } = match self.upstream.fetch(&url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(path = %path, error = %e, kind = e.kind(), "Upstream request failed");
                metrics::record_upstream_error(e.kind());
                return ProxyResponse::error(e.status_code(), e.to_string());
            }
        };

        if let Some(key) = &cache_key {
            self.store_if_admitted(path, key, status, &body).await;
        }

        ProxyResponse::miss(status, body)
    }

    /// Read the store; errors count as a miss.
    async fn lookup(&self, path: &str, key: &CacheKey) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(body)) => {
                tracing::debug!(path = %path, cache_key = %key, "Cache hit");
                metrics::record_cache_lookup("hit");
                Some(body)
            }
            Ok(None) => {
                tracing::debug!(path = %path, cache_key = %key, "Cache miss");
                metrics::record_cache_lookup("miss");
                None
            }
            Err(e) => {
                tracing::error!(path = %path, cache_key = %key, error = %e, "Cache lookup error");
                metrics::record_cache_lookup("error");
                None
            }
        }
    }

    /// Apply the admission policy and write; errors are logged and dropped.
    async fn store_if_admitted(&self, path: &str, key: &CacheKey, status: u16, body: &str) {
        if !self.classifier.should_cache_response(path, status, body) {
            tracing::debug!(path = %path, cache_key = %key, status, "Response not admitted to cache");
            metrics::record_cache_write("skipped");
            return;
        }

        match self.store.put(key, body.to_string()).await {
            Ok(()) => {
                tracing::debug!(path = %path, cache_key = %key, "Response cached");
                metrics::record_cache_write("stored");
            }
            Err(e) => {
                tracing::error!(path = %path, cache_key = %key, error = %e, "Cache write error");
                metrics::record_cache_write("error");
            }
        }
    }
}
