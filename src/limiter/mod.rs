use std::{sync::Arc, time::Duration};

use crate::{domain::RateDecision, infrastructure::clock::Clock};

pub mod store;

pub use store::{MemoryUsageStore, UsageRecord, UsageStore};

/// Uses allowed per identifier inside one window.
pub const DEFAULT_MAX_USES: u32 = 2;
/// Window length: 24 hours from an identifier's first use.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Fixed-window per-identifier quota. The window starts at the first use and
/// every counter resets once it passes; rejected attempts do not consume
/// quota. Identifiers are opaque strings (typically client IPs) and are not
/// validated here.
pub struct UsageLimiter {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    max_uses: u32,
    window_ms: i64,
}

impl UsageLimiter {
    pub fn new(
        store: Arc<dyn UsageStore>,
        clock: Arc<dyn Clock>,
        max_uses: u32,
        window: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            max_uses,
            window_ms: window.as_millis() as i64,
        }
    }

    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms as u64)
    }

    /// Admits or rejects one use. The full read-modify-write runs inside the
    /// store's per-key critical section, so two simultaneous calls for the
    /// same identifier serialize instead of both consuming the same slot.
    pub fn check(&self, identifier: &str) -> RateDecision {
        let now = self.clock.now_ms();
        let max_uses = self.max_uses;
        let window_ms = self.window_ms;
        let mut decision = RateDecision {
            allowed: false,
            remaining: 0,
        };

        self.store.with_record(identifier, &mut |record: &mut Option<UsageRecord>| {
            match record {
                Some(rec) if now <= rec.reset_at => {
                    if rec.count < max_uses {
                        rec.count += 1;
                        decision = RateDecision {
                            allowed: true,
                            remaining: max_uses - rec.count,
                        };
                    }
                    // over the cap: deny, record untouched
                }
                _ => {
                    // first use, or the previous window ended
                    *record = Some(UsageRecord {
                        count: 1,
                        reset_at: now + window_ms,
                    });
                    decision = RateDecision {
                        allowed: true,
                        remaining: max_uses.saturating_sub(1),
                    };
                }
            }
        });

        if !decision.allowed {
            tracing::debug!(target: "limiter", identifier, "usage limit reached");
        }
        decision
    }

    /// Read-only view of the quota left; agrees with what `check` just
    /// reported and never mutates state. Counts past the cap (possible only
    /// through an external store without transactional semantics) clamp to
    /// zero.
    pub fn remaining(&self, identifier: &str) -> u32 {
        let now = self.clock.now_ms();
        match self.store.peek(identifier) {
            Some(rec) if now <= rec.reset_at => self.max_uses.saturating_sub(rec.count),
            _ => self.max_uses,
        }
    }
}
