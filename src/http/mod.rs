//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, URI → ProxyRequest)
//!     → pipeline
//!     → response.rs (ProxyResponse → HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod tls;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
