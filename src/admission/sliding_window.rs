//! Sliding window admission.
//!
//! Exact log-based variant: at most `limit` admissions in any trailing
//! `window` interval, so the fixed-window boundary artifact cannot occur.
//! Memory per client is bounded by `limit` retained timestamps.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::admission::limiter::RateLimiter;

/// Sliding window rate limiter over a log of admitted-request times.
#[derive(Debug)]
pub struct SlidingWindow {
    limit: u64,
    window: Duration,
    /// Admission timestamps, oldest first; all within `[now - window, now]`.
    timestamps: Mutex<VecDeque<Instant>>,
}

impl SlidingWindow {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    #[cfg(test)]
    fn retained(&self) -> usize {
        self.timestamps
            .lock()
            .expect("sliding window mutex poisoned")
            .len()
    }
}

impl RateLimiter for SlidingWindow {
    fn allow(&self) -> bool {
        let mut timestamps = self
            .timestamps
            .lock()
            .expect("sliding window mutex poisoned");

        let now = Instant::now();
        // Prune everything strictly older than the trailing window; an
        // admission exactly `window` old still counts. O(k), bounded by
        // `limit` since the log never grows past it.
        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if (timestamps.len() as u64) < self.limit {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }
}
