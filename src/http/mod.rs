//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout + trace layers)
//!     → admission check (429 on deny)
//!     → forward to the configured upstream
//!     → relay response to client
//! ```

pub mod server;

pub use server::HttpServer;
