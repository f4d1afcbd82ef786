//! Per-client limiter registry.
//!
//! # Responsibilities
//! - Map client identity → (limiter instance, last-seen timestamp)
//! - Create limiters lazily on first contact, exactly once per identity
//! - Remove idle entries on behalf of the sweeper
//!
//! # Design Decisions
//! - Backed by a sharded concurrent map; the entry API makes
//!   lookup-or-create indivisible, so two racing first contacts from the
//!   same identity can never construct two limiters
//! - Shard locks are held only for resolve/insert/evict, never across the
//!   limiter's own `allow` critical section (independent lock domains)
//! - Limiters are exclusively owned by their entry and handed out as
//!   `Arc` clones; eviction drops the entry, not in-flight evaluations

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::admission::limiter::{build_limiter, RateLimiter};
use crate::config::schema::RateLimitConfig;

/// State tracked for one client identity.
struct ClientEntry {
    limiter: Arc<dyn RateLimiter>,
    last_seen: Instant,
}

/// Concurrent mapping from client identity to its limiter.
pub struct ClientRegistry {
    clients: DashMap<String, ClientEntry>,
    config: RateLimitConfig,
}

impl ClientRegistry {
    /// Create an empty registry. `config` is the process-wide limiter
    /// configuration every new entry is built from.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            clients: DashMap::new(),
            config,
        }
    }

    /// Return the limiter for `identity`, constructing and inserting one if
    /// this is the first contact. Updates the entry's last-seen timestamp.
    pub fn resolve(&self, identity: &str) -> Arc<dyn RateLimiter> {
        let mut entry = self
            .clients
            .entry(identity.to_string())
            .or_insert_with(|| {
                tracing::debug!(identity = %identity, algorithm = %self.config.algorithm, "Creating limiter for new client");
                ClientEntry {
                    limiter: build_limiter(&self.config),
                    last_seen: Instant::now(),
                }
            });
        entry.last_seen = Instant::now();
        entry.limiter.clone()
    }

    /// Remove every entry idle for at least `idle_timeout`. Returns the
    /// number of entries evicted.
    pub fn evict_idle(&self, idle_timeout: Duration) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, entry| entry.last_seen.elapsed() < idle_timeout);
        before.saturating_sub(self.clients.len())
    }

    /// Number of currently tracked client identities.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Whether `identity` currently has an entry (does not touch last-seen).
    pub fn contains(&self, identity: &str) -> bool {
        self.clients.contains_key(identity)
    }
}
