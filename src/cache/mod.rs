//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! full path ("/domain/path?query")
//!     → key.rs (SHA-256 hex digest)
//!     → store.rs (CacheStore get/put contract)
//!     → memory.rs (concurrent map, optional JSON file at the store location)
//! ```
//!
//! # Design Decisions
//! - Entries hold the body only; no status, headers or TTL
//! - Entries never expire and are never evicted
//! - Concurrent writers to one key race harmlessly (last writer wins)

pub mod key;
pub mod memory;
pub mod store;

pub use key::CacheKey;
pub use memory::MemoryStore;
pub use store::{CacheStore, StoreError};
