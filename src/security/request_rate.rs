use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::infrastructure::clock::Clock;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUESTS: usize = 10;

const CLEANUP_INTERVAL_MS: i64 = 5 * 60 * 1000;

/// Sliding-window request limiter guarding the contact endpoint. Each
/// identifier keeps the timestamps of its requests inside the window; empty
/// identifiers drop out during the periodic cleanup.
pub struct RequestRateLimiter {
    clock: Arc<dyn Clock>,
    window_ms: i64,
    max_requests: usize,
    inner: Mutex<LimiterState>,
}

struct LimiterState {
    requests: HashMap<String, Vec<i64>>,
    last_cleanup: i64,
}

impl RequestRateLimiter {
    pub fn new(clock: Arc<dyn Clock>, window: Duration, max_requests: usize) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            window_ms: window.as_millis() as i64,
            max_requests,
            inner: Mutex::new(LimiterState {
                requests: HashMap::new(),
                last_cleanup: now,
            }),
        }
    }

    /// Records and admits the request unless the identifier already spent
    /// its window budget. Denied requests are not recorded.
    pub fn is_allowed(&self, identifier: &str) -> bool {
        let now = self.clock.now_ms();
        let mut state = self.inner.lock();

        if now - state.last_cleanup > CLEANUP_INTERVAL_MS {
            let window_ms = self.window_ms;
            state
                .requests
                .retain(|_, times| {
                    times.retain(|t| now - t < window_ms);
                    !times.is_empty()
                });
            state.last_cleanup = now;
        }

        let times = state.requests.entry(identifier.to_string()).or_default();
        times.retain(|t| now - t < self.window_ms);

        if times.len() >= self.max_requests {
            return false;
        }
        times.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn admits_up_to_the_cap_within_one_window() {
        let clock = Arc::new(ManualClock::new(T0));
        let limiter = RequestRateLimiter::new(clock, DEFAULT_WINDOW, 3);

        assert!(limiter.is_allowed("ip"));
        assert!(limiter.is_allowed("ip"));
        assert!(limiter.is_allowed("ip"));
        assert!(!limiter.is_allowed("ip"));
        assert!(limiter.is_allowed("other-ip"));
    }

    #[test]
    fn budget_recovers_as_the_window_slides() {
        let clock = Arc::new(ManualClock::new(T0));
        let limiter = RequestRateLimiter::new(clock.clone(), DEFAULT_WINDOW, 2);

        assert!(limiter.is_allowed("ip"));
        clock.advance(30_000);
        assert!(limiter.is_allowed("ip"));
        assert!(!limiter.is_allowed("ip"));

        // first request falls out of the 60s window
        clock.advance(31_000);
        assert!(limiter.is_allowed("ip"));
    }

    #[test]
    fn denied_requests_do_not_consume_budget() {
        let clock = Arc::new(ManualClock::new(T0));
        let limiter = RequestRateLimiter::new(clock.clone(), DEFAULT_WINDOW, 1);

        assert!(limiter.is_allowed("ip"));
        for _ in 0..10 {
            assert!(!limiter.is_allowed("ip"));
        }
        clock.advance(60_001);
        assert!(limiter.is_allowed("ip"));
    }
}
