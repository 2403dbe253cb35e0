use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::infrastructure::clock::Clock;

const RESUBMIT_COOLDOWN_MS: i64 = 5 * 60 * 1000;
const RESET_WINDOW_MS: i64 = 60 * 60 * 1000;
const MAX_PER_HOUR: u32 = 3;

/// Why a submission was turned away by the per-IP policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionDenial {
    EmailReused,
    TooSoon,
    HourlyLimit,
}

impl SubmissionDenial {
    pub fn message(&self) -> &'static str {
        match self {
            SubmissionDenial::EmailReused => "Email address already used recently",
            SubmissionDenial::TooSoon => "Please wait before sending another message",
            SubmissionDenial::HourlyLimit => "Too many messages sent. Please try again later",
        }
    }
}

#[derive(Default)]
struct TrackerEntry {
    count: u32,
    last_submission: i64,
    emails: HashSet<String>,
}

/// Per-IP submission policy for the contact form: a cooldown between
/// messages, no same-email reuse within the hour, and an hourly cap. An idle
/// hour resets the counter and the seen-email set.
pub struct SubmissionTracker {
    clock: Arc<dyn Clock>,
    inner: Mutex<HashMap<String, TrackerEntry>>,
}

impl SubmissionTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Policy check for a would-be submission. Applies the idle-hour window
    /// reset as a side effect, like the recording path does.
    pub fn check(&self, ip: &str, email: &str) -> Result<(), SubmissionDenial> {
        let now = self.clock.now_ms();
        let mut map = self.inner.lock();
        let Some(entry) = map.get_mut(ip) else {
            return Ok(());
        };

        if entry.emails.contains(email) && now - entry.last_submission < RESET_WINDOW_MS {
            return Err(SubmissionDenial::EmailReused);
        }
        if now - entry.last_submission < RESUBMIT_COOLDOWN_MS {
            return Err(SubmissionDenial::TooSoon);
        }
        if now - entry.last_submission > RESET_WINDOW_MS {
            entry.count = 0;
            entry.emails.clear();
        }
        if entry.count >= MAX_PER_HOUR {
            return Err(SubmissionDenial::HourlyLimit);
        }
        Ok(())
    }

    /// Records an accepted submission.
    pub fn record(&self, ip: &str, email: &str) {
        let now = self.clock.now_ms();
        let mut map = self.inner.lock();
        let entry = map.entry(ip.to_string()).or_default();
        entry.count += 1;
        entry.last_submission = now;
        entry.emails.insert(email.to_string());
    }

    /// Drops entries idle past the reset window. Returns how many were
    /// removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let mut map = self.inner.lock();
        let before = map.len();
        map.retain(|_, entry| now - entry.last_submission <= RESET_WINDOW_MS);
        before - map.len()
    }
}
