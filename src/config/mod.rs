//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse, apply TABLE_NAME override)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to the classifier, store and server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    CacheConfig, CacheFamily, CacheablePathConfig, ListenerConfig, ObservabilityConfig,
    ProxyConfig, TimeoutConfig, TlsConfig, UpstreamConfig,
};
pub use validation::ValidationError;
