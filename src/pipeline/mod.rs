//! Proxy pipeline.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (rawPath, queryStringParameters)
//!     → classifier: domain allowed?          no  → 403 {"error": "Domain not allowed"}
//!     → classifier: cacheable path?          yes → store.get(sha256(full path))
//!                                                  hit → 200 body, X-Cache: HIT
//!     → upstream.fetch(scheme://full path)   err → status or 500, {"error": ...}
//!     → classifier: should cache response?   yes → store.put (best-effort)
//!     → ProxyResponse (status, body, X-Cache: MISS)
//! ```
//!
//! # Design Decisions
//! - Lookup, fetch and write run sequentially within one request
//! - Store failures never reach the caller
//! - No single-flight: concurrent misses on one key each fetch upstream

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{Pipeline, DOMAIN_NOT_ALLOWED};
pub use request::{ProxyRequest, QueryParams};
pub use response::{CacheStatus, ProxyResponse};
