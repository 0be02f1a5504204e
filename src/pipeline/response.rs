//! Outbound response descriptor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const X_CACHE: &str = "X-Cache";
const APPLICATION_JSON: &str = "application/json";

/// Whether a response was served from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// A response as returned to the hosting runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ProxyResponse {
    fn json(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        Self {
            status_code,
            body,
            headers,
        }
    }

    /// A body served from the store. Always 200.
    pub fn hit(body: String) -> Self {
        Self::json(200, body).with_cache_status(CacheStatus::Hit)
    }

    /// A body fetched from the upstream, passed through verbatim.
    pub fn miss(status_code: u16, body: String) -> Self {
        Self::json(status_code, body).with_cache_status(CacheStatus::Miss)
    }

    /// A JSON error of the form `{"error": message}`.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        let body = serde_json::json!({ "error": message.into() }).to_string();
        Self::json(status_code, body)
    }

    fn with_cache_status(mut self, status: CacheStatus) -> Self {
        self.headers
            .insert(X_CACHE.to_string(), status.as_str().to_string());
        self
    }

    /// Value of the `X-Cache` header, if present.
    pub fn cache_status(&self) -> Option<CacheStatus> {
        match self.headers.get(X_CACHE).map(String::as_str) {
            Some("HIT") => Some(CacheStatus::Hit),
            Some("MISS") => Some(CacheStatus::Miss),
            _ => None,
        }
    }
}
