//! Sliding-window guard on outbound provider calls

use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter for API requests
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per minute, 0 means unlimited
    max_requests_per_minute: u32,
    /// Request timestamps within the current window
    request_times: Vec<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute,
            request_times: Vec::new(),
        }
    }

    /// Check if a request is allowed and record it
    pub fn allow_request(&mut self) -> bool {
        if self.max_requests_per_minute == 0 {
            return true;
        }

        self.cleanup_old_requests(Instant::now());

        if self.request_times.len() >= self.max_requests_per_minute as usize {
            false
        } else {
            self.request_times.push(Instant::now());
            true
        }
    }

    /// Get time until next request is allowed
    pub fn time_until_next_request(&mut self) -> Duration {
        let now = Instant::now();
        self.cleanup_old_requests(now);

        if self.max_requests_per_minute == 0
            || self.request_times.len() < self.max_requests_per_minute as usize
        {
            return Duration::ZERO;
        }

        self.request_times
            .first()
            .map_or(Duration::ZERO, |oldest| {
                WINDOW.saturating_sub(now.duration_since(*oldest))
            })
    }

    fn cleanup_old_requests(&mut self, now: Instant) {
        self.request_times
            .retain(|&time| now.duration_since(time) < WINDOW);
    }
}
