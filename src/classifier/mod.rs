//! Request classification.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → is_allowed_domain (allowlist prefix scan)
//!     → is_cacheable_path (cacheable table prefix scan)
//!
//! Upstream response (after a successful fetch)
//!     → should_cache_response (family, status, body)
//! ```
//!
//! # Design Decisions
//! - Built once from config, immutable afterwards (shared via Arc)
//! - Pure: no I/O, no clock, no store access

pub mod admission;
pub mod matcher;

use crate::config::{CacheFamily, UpstreamConfig};

pub use admission::CACHEABLE_STATUS;
pub use matcher::{strip_separator, PrefixMatcher};

/// Decides which requests are allowed and which responses are stored.
#[derive(Debug, Clone)]
pub struct Classifier {
    domains: PrefixMatcher<()>,
    cacheable: PrefixMatcher<CacheFamily>,
}

impl Classifier {
    /// Build the classifier from the upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            domains: PrefixMatcher::new(config.allowed_domains.iter().map(|d| (d.clone(), ()))),
            cacheable: PrefixMatcher::new(
                config
                    .cacheable_paths
                    .iter()
                    .map(|p| (p.prefix.clone(), p.family)),
            ),
        }
    }

    /// Returns true if the path targets an allowlisted domain.
    pub fn is_allowed_domain(&self, path: &str) -> bool {
        self.domains.matches(path)
    }

    /// Returns true if responses for this path are candidates for caching.
    pub fn is_cacheable_path(&self, path: &str) -> bool {
        self.cacheable.matches(path)
    }

    /// Family of the first cacheable prefix matching the path.
    pub fn family(&self, path: &str) -> Option<CacheFamily> {
        self.cacheable.find(path).copied()
    }

    /// Admission policy for a fetched response.
    pub fn should_cache_response(&self, path: &str, status: u16, body: &str) -> bool {
        let Some(family) = self.family(path) else {
            return false;
        };
        if status != CACHEABLE_STATUS {
            return false;
        }
        family.admits(body)
    }
}
