//! The limiter seam: one capability, many algorithms.
//!
//! # Design Decisions
//! - A single trait method (`allow`) keeps the seam as narrow as the
//!   decision itself; callers never see algorithm internals
//! - `allow` takes `&self` and each implementation guards its own state,
//!   so a limiter can be shared across request handlers as `Arc<dyn _>`
//! - Disabling admission control is a limiter too (`NoLimiter`), not a
//!   branch in the caller

use std::sync::Arc;

use crate::admission::fixed_window::FixedWindow;
use crate::admission::leaky_bucket::LeakyBucket;
use crate::admission::sliding_window::SlidingWindow;
use crate::admission::token_bucket::TokenBucket;
use crate::config::schema::{Algorithm, RateLimitConfig};

/// An admission decision procedure over private, self-guarded state.
///
/// `allow` atomically evaluates and mutates that state: the elapsed-time
/// bookkeeping (refill, leak, window roll, prune) and the consumption of a
/// token/slot happen in one critical section.
pub trait RateLimiter: Send + Sync {
    /// Returns true if the request may proceed now.
    fn allow(&self) -> bool;
}

/// Limiter that admits everything.
///
/// Substitutes polymorphically for a real algorithm when admission control
/// is disabled, so the registry and handler paths stay identical.
#[derive(Debug, Default)]
pub struct NoLimiter;

impl RateLimiter for NoLimiter {
    fn allow(&self) -> bool {
        true
    }
}

/// Construct a limiter instance from the process-wide configuration.
///
/// Called by the registry once per newly-seen client identity.
pub fn build_limiter(config: &RateLimitConfig) -> Arc<dyn RateLimiter> {
    match config.algorithm {
        Algorithm::TokenBucket => {
            Arc::new(TokenBucket::new(config.burst_size, config.tick_interval()))
        }
        Algorithm::LeakyBucket => {
            Arc::new(LeakyBucket::new(config.burst_size, config.tick_interval()))
        }
        Algorithm::FixedWindow => {
            Arc::new(FixedWindow::new(config.window_limit(), config.window()))
        }
        Algorithm::SlidingWindow => {
            Arc::new(SlidingWindow::new(config.window_limit(), config.window()))
        }
        Algorithm::NoRateLimit => Arc::new(NoLimiter),
    }
}
