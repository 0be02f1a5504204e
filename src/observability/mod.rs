//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline, store and server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (when enabled)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) attached by the HTTP layer and logged per request
//! - Metrics are cheap and silently dropped when no exporter is installed

pub mod logging;
pub mod metrics;
