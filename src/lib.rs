//! Caching proxy for financial-data HTTP APIs.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http ──▶ pipeline ──▶ classifier (allowlist)     │
//!                             │               │                                    │
//!                             │               ├──▶ cache (sha256 key, get)         │
//!                             │               │                                    │
//!                             │               ├──▶ upstream (GET https://...) ─────┼──▶ Upstream API
//!                             │               │                                    │
//!                             │               └──▶ classifier (admission) → put    │
//!     Client Response         │                                                    │
//!     ◀───────────────────────┼── http ◀── ProxyResponse (X-Cache: HIT | MISS)     │
//!                             │                                                    │
//!                             │  config · observability · lifecycle                │
//!                             └──────────────────────────────────────────────────┘
//! ```

// Core
pub mod cache;
pub mod classifier;
pub mod pipeline;
pub mod upstream;

// Surfaces
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Pipeline, ProxyRequest, ProxyResponse};
