//! rategate: a rate-limiting reverse proxy.
//!
//! Sits in front of a single HTTP backend and decides, per client IP,
//! whether each request is forwarded or rejected with 429.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────┐
//!                      │                 RATEGATE                  │
//!                      │                                           │
//!   Client Request     │  ┌────────┐    ┌───────────────────────┐  │
//!   ──────────────────▶│  │  http  │───▶│      admission        │  │
//!                      │  │ server │    │ registry + algorithms │  │
//!                      │  └───┬────┘    └───────────┬───────────┘  │
//!                      │      │                     │              │
//!                      │      │ allow               │ deny         │
//!                      │      ▼                     ▼              │
//!   Client Response    │  ┌────────┐         ┌───────────┐         │
//!   ◀──────────────────│  │forward │         │    429    │         │──── Backend
//!                      │  └────────┘         └───────────┘         │     Server
//!                      │                                           │
//!                      │  ┌─────────────────────────────────────┐  │
//!                      │  │        Cross-Cutting Concerns       │  │
//!                      │  │  config · lifecycle · observability │  │
//!                      │  └─────────────────────────────────────┘  │
//!                      └───────────────────────────────────────────┘
//! ```
//!
//! Five interchangeable algorithms sit behind the [`admission::RateLimiter`]
//! trait: token bucket, leaky bucket, fixed window, sliding window, and a
//! pass-through. A background sweeper evicts limiter state for clients that
//! have gone quiet.

// Core subsystems
pub mod admission;
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use admission::AdmissionController;
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
