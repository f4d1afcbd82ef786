//! Token bucket admission.
//!
//! A pool of `capacity` tokens refills at one token per `interval`. Each
//! admitted request consumes one token; an empty pool denies.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::admission::limiter::RateLimiter;

#[derive(Debug)]
struct BucketState {
    tokens: u64,
    last_refill: Instant,
}

/// Token bucket rate limiter.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    interval: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket. `capacity` of zero denies every request.
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self {
            capacity: u64::from(capacity),
            interval,
            state: Mutex::new(BucketState {
                tokens: u64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    #[cfg(test)]
    fn tokens(&self) -> u64 {
        self.state.lock().expect("token bucket mutex poisoned").tokens
    }
}

impl RateLimiter for TokenBucket {
    fn allow(&self) -> bool {
        let mut state = self.state.lock().expect("token bucket mutex poisoned");

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill);
        let ticks = (elapsed.as_nanos() / self.interval.as_nanos().max(1)) as u64;

        if ticks > 0 {
            if state.tokens.saturating_add(ticks) >= self.capacity {
                // Saturated: excess refill is forfeited, so idle time cannot
                // bank credit beyond capacity.
                state.tokens = self.capacity;
                state.last_refill = now;
            } else {
                // Advance by whole ticks only, keeping fractional progress
                // toward the next token.
                state.tokens += ticks;
                state.last_refill += self.interval * (ticks as u32);
            }
        }

        if state.tokens > 0 {
            state.tokens -= 1;
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
    fn test_burst_admits_exactly_capacity() {
        let bucket = TokenBucket::new(5, Duration::from_secs(1));
        for _ in 0..5 {
            assert!(bucket.allow());
        }
        assert!(!bucket.allow(), "call past capacity must be denied");
    }

    #[test]
    fn test_tokens_stay_bounded() {
        let bucket = TokenBucket::new(3, Duration::from_millis(1));
        // Let far more than `capacity` refill intervals elapse.
        sleep(Duration::from_millis(50));
        assert!(bucket.allow());
        assert!(bucket.tokens() <= 3);

        // Drain fully; the count never goes negative (denials leave it at 0).
        while bucket.allow() {}
        assert_eq!(bucket.tokens(), 0);
        assert!(!bucket.allow());
        assert_eq!(bucket.tokens(), 0);
    }

    #[test]
    fn test_refill_after_interval() {
        let bucket = TokenBucket::new(2, Duration::from_millis(30));
        assert!(bucket.allow());
        assert!(bucket.allow());
        assert!(!bucket.allow());

        sleep(Duration::from_millis(45));
        assert!(bucket.allow(), "one interval elapsed, one token back");
        assert!(!bucket.allow());
    }

    #[test]
    fn test_zero_capacity_always_denies() {
        let bucket = TokenBucket::new(0, Duration::from_millis(1));
        sleep(Duration::from_millis(10));
        assert!(!bucket.allow());
        assert!(!bucket.allow());
    }

    #[test]
    fn test_fractional_progress_carries() {
        let bucket = TokenBucket::new(10, Duration::from_millis(40));
        while bucket.allow() {}

        // Two half-interval waits must yield one token, not zero: the first
        // call sees no whole tick but the remainder is not discarded.
        sleep(Duration::from_millis(25));
        assert!(!bucket.allow());
        sleep(Duration::from_millis(25));
        assert!(bucket.allow());
    }

    #[test]
    fn test_concurrent_burst_admits_capacity_total() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let bucket = Arc::new(TokenBucket::new(50, Duration::from_secs(1)));
        let admitted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bucket = bucket.clone();
                let admitted = admitted.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        if bucket.allow() {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 50);
    }
}
