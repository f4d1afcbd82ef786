//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identity (client source IP, extracted by the HTTP layer)
//!     → registry.rs (resolve or lazily create the client's limiter)
//!     → algorithm allow() (token_bucket / leaky_bucket / fixed_window /
//!       sliding_window / NoLimiter)
//!     → allow: proxy forwards   deny: proxy answers 429
//!
//! Independently:
//!     sweeper.rs evicts registry entries idle past the threshold
//! ```
//!
//! # Design Decisions
//! - The algorithms are a closed set behind one trait capability; each owns
//!   disjoint state, so there is no shared mutable base
//! - The controller is an explicit object owning registry and configuration;
//!   nothing in this subsystem is process-global, so tests can run several
//!   independently configured instances side by side
//! - Capacity exhaustion is a boolean outcome, never an error

pub mod fixed_window;
pub mod leaky_bucket;
pub mod limiter;
pub mod registry;
pub mod sliding_window;
pub mod sweeper;
pub mod token_bucket;

pub use limiter::{build_limiter, NoLimiter, RateLimiter};
pub use registry::ClientRegistry;
pub use sweeper::Sweeper;

use std::sync::Arc;

use crate::config::schema::{Algorithm, RateLimitConfig, SweeperConfig};

/// The admission entry point handed to the HTTP layer.
///
/// Owns the per-client registry and the limiter configuration, and wires the
/// sweeper over the same registry.
pub struct AdmissionController {
    registry: Arc<ClientRegistry>,
    algorithm: Algorithm,
}

impl AdmissionController {
    pub fn new(config: RateLimitConfig) -> Self {
        let algorithm = config.algorithm;
        Self {
            registry: Arc::new(ClientRegistry::new(config)),
            algorithm,
        }
    }

    /// Decide whether the request from `identity` may proceed now.
    ///
    /// Resolves (or lazily creates) the client's limiter and evaluates it.
    pub fn allow(&self, identity: &str) -> bool {
        self.registry.resolve(identity).allow()
    }

    /// The configured algorithm, for logging and metric labels.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Number of currently tracked client identities.
    pub fn tracked_clients(&self) -> usize {
        self.registry.len()
    }

    /// Build the eviction sweeper over this controller's registry.
    pub fn sweeper(&self, config: &SweeperConfig) -> Sweeper {
        Sweeper::new(self.registry.clone(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_tracks_per_identity_state() {
        let controller = AdmissionController::new(RateLimitConfig {
            algorithm: Algorithm::TokenBucket,
            requests_per_second: 1,
            burst_size: 2,
            window_secs: 1,
        });

        assert!(controller.allow("1.1.1.1"));
        assert!(controller.allow("1.1.1.1"));
        assert!(!controller.allow("1.1.1.1"));

        // An unrelated identity is unaffected.
        assert!(controller.allow("2.2.2.2"));
        assert_eq!(controller.tracked_clients(), 2);
    }

    #[test]
    fn test_independent_controllers_do_not_share_state() {
        let config = RateLimitConfig {
            algorithm: Algorithm::TokenBucket,
            requests_per_second: 1,
            burst_size: 1,
            window_secs: 1,
        };
        let a = AdmissionController::new(config.clone());
        let b = AdmissionController::new(config);

        assert!(a.allow("9.9.9.9"));
        assert!(!a.allow("9.9.9.9"));
        assert!(b.allow("9.9.9.9"), "second controller has its own registry");
    }

    #[test]
    fn test_no_rate_limit_admits_everything() {
        let controller = AdmissionController::new(RateLimitConfig {
            algorithm: Algorithm::NoRateLimit,
            ..Default::default()
        });
        for _ in 0..10_000 {
            assert!(controller.allow("3.3.3.3"));
        }
    }
}
