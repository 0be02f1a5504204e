//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the caching proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream allowlist and cacheable path table.
    pub upstream: UpstreamConfig,

    /// Cache store settings.
    pub cache: CacheConfig,

    /// Timeout configuration for the HTTP surface.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Admission policy family a cacheable prefix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheFamily {
    /// Historical exchange rates. Every 200 response is stored.
    HistoricalRates,
    /// End-of-day quotes. 200 responses wrapping a transient error code are skipped.
    EndOfDay,
}

/// A `domain/path-prefix` eligible for caching.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheablePathConfig {
    /// Prefix matched against the request path without its leading `/`.
    pub prefix: String,

    /// Admission policy applied to responses under this prefix.
    pub family: CacheFamily,
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Domain prefixes requests may target.
    pub allowed_domains: Vec<String>,

    /// URL scheme used to reach upstreams.
    pub scheme: String,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,

    /// Cacheable path prefixes, checked in order.
    pub cacheable_paths: Vec<CacheablePathConfig>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            allowed_domains: vec![
                "openexchangerates.org".to_string(),
                "api.twelvedata.com".to_string(),
            ],
            scheme: "https".to_string(),
            timeout_secs: 10,
            cacheable_paths: vec![
                CacheablePathConfig {
                    prefix: "openexchangerates.org/api/historical".to_string(),
                    family: CacheFamily::HistoricalRates,
                },
                CacheablePathConfig {
                    prefix: "api.twelvedata.com/eod".to_string(),
                    family: CacheFamily::EndOfDay,
                },
            ],
        }
    }
}

/// Cache store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store location. Empty keeps entries in memory only.
    pub location: String,

    /// How often the store is flushed to its location, in seconds.
    pub flush_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: String::new(),
            flush_interval_secs: 30,
        }
    }
}

/// Timeout configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
