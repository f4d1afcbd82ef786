//! Process lifecycle: startup ordering and graceful shutdown.
//!
//! # Design Decisions
//! - One broadcast channel fans the stop signal out to every long-running
//!   task; tasks exit their loops, they are never aborted
//! - Signal handling lives here so main stays declarative

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
