//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Open store → Build upstream client → Pipeline
//!
//! Invoke (invoke.rs):
//!     Descriptor → Pipeline → flush store (soft) → response descriptor
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → server drains, flusher writes the store → exit
//! ```

pub mod invoke;
pub mod shutdown;
pub mod startup;

pub use invoke::{invoke, InvokeError};
pub use shutdown::Shutdown;
pub use startup::{build_pipeline, StartupError};
