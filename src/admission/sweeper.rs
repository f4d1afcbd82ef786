//! Idle-client eviction.
//!
//! # Responsibilities
//! - Periodically scan the registry and drop entries idle past the threshold
//! - Keep registry memory bounded by the set of recently active identities
//! - Exit promptly on shutdown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::admission::registry::ClientRegistry;
use crate::config::SweeperConfig;
use crate::observability::metrics;

/// Background task that evicts idle client entries.
///
/// A returning client whose entry was swept simply starts over with a fresh
/// limiter; admission state resets rather than persisting across long gaps.
pub struct Sweeper {
    registry: Arc<ClientRegistry>,
    interval: Duration,
    idle_timeout: Duration,
}

impl Sweeper {
    pub fn new(registry: Arc<ClientRegistry>, config: &SweeperConfig) -> Self {
        Self {
            registry,
            interval: config.interval(),
            idle_timeout: config.idle_timeout(),
        }
    }

    /// Run until the shutdown signal fires. One sweep per interval tick.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            idle_timeout_secs = self.idle_timeout.as_secs(),
            "Sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; skip it so a sweep never
        // races the first requests after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// A single scan-and-evict pass.
    fn sweep(&self) {
        let evicted = self.registry.evict_idle(self.idle_timeout);
        let tracked = self.registry.len();
        if evicted > 0 {
            tracing::debug!(evicted, tracked, "Swept idle clients");
        }
        metrics::record_tracked_clients(tracked);
    }
}
