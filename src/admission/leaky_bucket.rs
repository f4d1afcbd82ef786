//! Leaky bucket admission.
//!
//! Models a fixed-capacity queue that drains one slot per `interval`. A
//! request is admitted iff the queue has room after draining elapsed slots.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::admission::limiter::RateLimiter;

#[derive(Debug)]
struct QueueState {
    current: u64,
    last_leak: Instant,
}

/// Leaky bucket rate limiter.
#[derive(Debug)]
pub struct LeakyBucket {
    capacity: u64,
    interval: Duration,
    state: Mutex<QueueState>,
}

impl LeakyBucket {
    /// Create an empty queue. `capacity` of zero denies every request.
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self {
            capacity: u64::from(capacity),
            interval,
            state: Mutex::new(QueueState {
                current: 0,
                last_leak: Instant::now(),
            }),
        }
    }
}

impl RateLimiter for LeakyBucket {
    fn allow(&self) -> bool {
        let mut state = self.state.lock().expect("leaky bucket mutex poisoned");

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_leak);
        let leaks = (elapsed.as_nanos() / self.interval.as_nanos().max(1)) as u64;

        if leaks > 0 {
            if leaks >= state.current {
                // Drained empty: restart leak accounting from now.
                state.current = 0;
                state.last_leak = now;
            } else {
                // Drain whole slots only, keeping fractional progress
                // toward the next leak.
                state.current -= leaks;
                state.last_leak += self.interval * (leaks as u32);
            }
        }

        if state.current < self.capacity {
            state.current += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_admits_until_full() {
        let bucket = LeakyBucket::new(3, Duration::from_secs(1));
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow(), "queue full, must deny");
    }

    #[test]
    fn test_drain_frees_slots() {
        let bucket = LeakyBucket::new(4, Duration::from_millis(20));
        for _ in 0..4 {
            assert!(bucket.allow());
        }
        assert!(!bucket.allow());

        // Waiting ~2 intervals drains 2 slots.
        sleep(Duration::from_millis(50));
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn test_drain_bounded_by_occupancy() {
        let bucket = LeakyBucket::new(2, Duration::from_millis(10));
        assert!(bucket.allow());

        // Far more intervals elapse than there are queued slots; the count
        // clamps at zero rather than going negative.
        sleep(Duration::from_millis(100));
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn test_zero_capacity_always_denies() {
        let bucket = LeakyBucket::new(0, Duration::from_millis(1));
        assert!(!bucket.allow());
        sleep(Duration::from_millis(10));
        assert!(!bucket.allow());
    }
}
