//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by status and cache result
//! - `proxy_request_duration_seconds` (histogram): pipeline latency
//! - `proxy_cache_lookups_total` (counter): hit, miss, error
//! - `proxy_cache_writes_total` (counter): stored, skipped, error
//! - `proxy_upstream_errors_total` (counter): status, transport
//! - `proxy_cache_entries` (gauge): entries held by the store
//!
//! Recording is a no-op until a recorder is installed by [`init_metrics`].

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, cache: &'static str, start: Instant) {
    counter!("proxy_requests_total", "status" => status.to_string(), "cache" => cache).increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(result: &'static str) {
    counter!("proxy_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_write(result: &'static str) {
    counter!("proxy_cache_writes_total", "result" => result).increment(1);
}

pub fn record_upstream_error(kind: &'static str) {
    counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("proxy_cache_entries").set(entries as f64);
}
