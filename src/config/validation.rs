//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and reports every
//! problem at once rather than stopping at the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.allowed_domains must not be empty")]
    NoAllowedDomains,

    #[error("upstream.allowed_domains[{0}] is empty")]
    EmptyDomain(usize),

    #[error("upstream.cacheable_paths[{0}] has an empty prefix")]
    EmptyPrefix(usize),

    #[error("cacheable prefix '{0}' is not under any allowed domain")]
    PrefixOutsideAllowlist(String),

    #[error("unsupported upstream scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request}) must exceed upstream.timeout_secs ({upstream})")]
    RequestTimeoutTooShort { request: u64, upstream: u64 },

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let upstream = &config.upstream;

    if upstream.allowed_domains.is_empty() {
        errors.push(ValidationError::NoAllowedDomains);
    }
    for (i, domain) in upstream.allowed_domains.iter().enumerate() {
        if domain.trim().is_empty() {
            errors.push(ValidationError::EmptyDomain(i));
        }
    }

    for (i, path) in upstream.cacheable_paths.iter().enumerate() {
        if path.prefix.trim().is_empty() {
            errors.push(ValidationError::EmptyPrefix(i));
            continue;
        }
        let covered = upstream
            .allowed_domains
            .iter()
            .any(|d| !d.is_empty() && path.prefix.starts_with(d.as_str()));
        if !covered {
            errors.push(ValidationError::PrefixOutsideAllowlist(path.prefix.clone()));
        }
    }

    if upstream.scheme != "http" && upstream.scheme != "https" {
        errors.push(ValidationError::UnsupportedScheme(upstream.scheme.clone()));
    }

    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if upstream.timeout_secs > 0
        && config.timeouts.request_secs > 0
        && config.timeouts.request_secs <= upstream.timeout_secs
    {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request: config.timeouts.request_secs,
            upstream: upstream.timeout_secs,
        });
    }
    if config.cache.flush_interval_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("cache.flush_interval_secs"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
