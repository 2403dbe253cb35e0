use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;

use crate::{
    domain::{ContactStats, MonitorExport, ScoredSubmission, Submission},
    infrastructure::clock::Clock,
};

pub mod scoring;

pub use scoring::{AUTO_BLOCK_THRESHOLD, SUSPICIOUS_THRESHOLD};

use scoring::FREQUENCY_WINDOW_MS;

const TOP_IPS_LIMIT: usize = 10;

/// How long scored submissions are kept. Covers the admin API's maximum
/// lookback of 7 days; anything older is swept.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Tracks contact-form submissions, scores them for spam signals and keeps
/// the manual/automatic block lists. All state lives behind one mutex held
/// for the duration of each operation, so concurrent requests cannot observe
/// or produce torn updates.
pub struct ContactMonitor {
    clock: Arc<dyn Clock>,
    retention_ms: i64,
    inner: Mutex<MonitorState>,
}

#[derive(Default)]
struct MonitorState {
    history: VecDeque<ScoredSubmission>,
    total_submissions: u64,
    blocked_ips: HashSet<String>,
    blocked_emails: HashSet<String>,
}

impl ContactMonitor {
    pub fn new(clock: Arc<dyn Clock>, retention: Duration) -> Self {
        Self {
            clock,
            retention_ms: retention.as_millis() as i64,
            inner: Mutex::new(MonitorState::default()),
        }
    }

    /// Scores and records a submission. Auto-blocks the submitting IP when
    /// the score crosses the auto-block threshold. Total: never fails.
    pub fn log_submission(&self, submission: Submission) -> ScoredSubmission {
        let now = self.clock.now_ms();
        let mut state = self.inner.lock();

        let prior_from_ip = state
            .history
            .iter()
            .filter(|s| s.ip() == submission.ip && now - s.timestamp() < FREQUENCY_WINDOW_MS)
            .count();

        let spam_score = scoring::calculate_spam_score(&submission, prior_from_ip);
        let suspicious = spam_score > SUSPICIOUS_THRESHOLD;
        let scored = ScoredSubmission {
            submission,
            spam_score,
            suspicious,
        };

        if spam_score > AUTO_BLOCK_THRESHOLD {
            state.blocked_ips.insert(scored.ip().to_string());
            tracing::warn!(
                target: "monitor",
                ip = scored.ip(),
                spam_score,
                "auto-blocked suspicious ip"
            );
        }

        state.history.push_back(scored.clone());
        state.total_submissions += 1;
        Self::evict_expired(&mut state, now, self.retention_ms);

        scored
    }

    pub fn is_blocked_ip(&self, ip: &str) -> bool {
        self.inner.lock().blocked_ips.contains(ip)
    }

    pub fn is_blocked_email(&self, email: &str) -> bool {
        self.inner
            .lock()
            .blocked_emails
            .contains(&email.to_lowercase())
    }

    pub fn block_ip(&self, ip: &str) {
        self.inner.lock().blocked_ips.insert(ip.to_string());
    }

    pub fn block_email(&self, email: &str) {
        self.inner.lock().blocked_emails.insert(email.to_lowercase());
    }

    /// Suspicious submissions within the trailing `hours` window, highest
    /// score first. Equal scores keep arrival order. A zero or negative
    /// window yields an empty list.
    pub fn suspicious_activity(&self, hours: i64) -> Vec<ScoredSubmission> {
        let now = self.clock.now_ms();
        let cutoff = now - hours.saturating_mul(60 * 60 * 1000);
        let state = self.inner.lock();

        let mut entries: Vec<ScoredSubmission> = state
            .history
            .iter()
            .filter(|s| s.timestamp() > cutoff && s.suspicious)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.spam_score.cmp(&a.spam_score));
        entries
    }

    pub fn stats(&self) -> ContactStats {
        let now = self.clock.now_ms();
        let state = self.inner.lock();

        let last_24h: Vec<&ScoredSubmission> = state
            .history
            .iter()
            .filter(|s| now - s.timestamp() < FREQUENCY_WINDOW_MS)
            .collect();
        let suspicious = last_24h.iter().filter(|s| s.suspicious).count();

        let mut ip_counts: HashMap<&str, u64> = HashMap::new();
        for s in &last_24h {
            *ip_counts.entry(s.ip()).or_insert(0) += 1;
        }
        let mut top_ips: Vec<(String, u64)> = ip_counts
            .into_iter()
            .map(|(ip, count)| (ip.to_string(), count))
            .collect();
        top_ips.sort_by(|a, b| b.1.cmp(&a.1));
        top_ips.truncate(TOP_IPS_LIMIT);

        ContactStats {
            total_submissions: state.total_submissions,
            last_24h: last_24h.len(),
            suspicious,
            blocked_ips: state.blocked_ips.len(),
            blocked_emails: state.blocked_emails.len(),
            top_ips,
        }
    }

    /// Full dump for offline analysis.
    pub fn export(&self) -> MonitorExport {
        let state = self.inner.lock();
        MonitorExport {
            submissions: state.history.iter().cloned().collect(),
            blocked_ips: state.blocked_ips.iter().cloned().collect(),
            blocked_emails: state.blocked_emails.iter().cloned().collect(),
        }
    }

    /// Drops history entries older than the retention window. Returns how
    /// many were removed. `total_submissions` is unaffected.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.inner.lock();
        Self::evict_expired(&mut state, now, self.retention_ms)
    }

    fn evict_expired(state: &mut MonitorState, now: i64, retention_ms: i64) -> usize {
        let mut removed = 0;
        while let Some(front) = state.history.front() {
            if now - front.timestamp() > retention_ms {
                state.history.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;

    const HOUR_MS: i64 = 60 * 60 * 1000;
    const T0: i64 = 1_700_000_000_000;

    fn monitor_at(now_ms: i64) -> (Arc<ManualClock>, ContactMonitor) {
        let clock = Arc::new(ManualClock::new(now_ms));
        let monitor = ContactMonitor::new(clock.clone(), DEFAULT_RETENTION);
        (clock, monitor)
    }

    fn clean_submission(ip: &str, timestamp: i64) -> Submission {
        Submission {
            ip: ip.into(),
            email: format!("visitor@{ip}.example"),
            name: "Alex Visitor".into(),
            subject: "Working together".into(),
            message: "I enjoyed reading about your recent projects.".into(),
            timestamp,
            user_agent: Some("test-agent".into()),
        }
    }

    fn submission_with_message(ip: &str, timestamp: i64, message: &str) -> Submission {
        Submission {
            message: message.into(),
            ..clean_submission(ip, timestamp)
        }
    }

    #[test]
    fn clean_first_submission_is_not_suspicious() {
        let (_, monitor) = monitor_at(T0);
        let scored = monitor.log_submission(clean_submission("198.51.100.1", T0));
        assert_eq!(scored.spam_score, 0);
        assert!(!scored.suspicious);
    }

    #[test]
    fn score_of_exactly_five_is_not_suspicious() {
        let (_, monitor) = monitor_at(T0);
        // bitcoin + casino + lottery + crypto + viagra = 5 vocabulary hits
        let scored = monitor.log_submission(submission_with_message(
            "198.51.100.2",
            T0,
            "we discuss bitcoin and casino and lottery and crypto and viagra",
        ));
        assert_eq!(scored.spam_score, 5);
        assert!(!scored.suspicious);
    }

    #[test]
    fn score_of_six_is_suspicious() {
        let (_, monitor) = monitor_at(T0);
        let scored = monitor.log_submission(submission_with_message(
            "198.51.100.3",
            T0,
            "bitcoin casino lottery crypto viagra cialis all mentioned here",
        ));
        assert_eq!(scored.spam_score, 6);
        assert!(scored.suspicious);
    }

    #[test]
    fn repeated_submissions_raise_frequency_score() {
        let (clock, monitor) = monitor_at(T0);
        let ip = "198.51.100.4";

        for i in 0..6u32 {
            clock.set(T0 + i as i64 * 1000);
            let scored = monitor.log_submission(clean_submission(ip, T0 + i as i64 * 1000));
            assert_eq!(scored.spam_score, i * 2);
        }
        // sixth submission saw five priors: 10 points, still not auto-blocked
        assert!(!monitor.is_blocked_ip(ip));

        clock.set(T0 + 7_000);
        let scored = monitor.log_submission(clean_submission(ip, T0 + 7_000));
        assert_eq!(scored.spam_score, 12);
        assert!(monitor.is_blocked_ip(ip));
    }

    #[test]
    fn submissions_outside_24h_do_not_count_toward_frequency() {
        let (clock, monitor) = monitor_at(T0);
        let ip = "198.51.100.5";
        monitor.log_submission(clean_submission(ip, T0));

        clock.set(T0 + 25 * HOUR_MS);
        let scored = monitor.log_submission(clean_submission(ip, T0 + 25 * HOUR_MS));
        assert_eq!(scored.spam_score, 0);
    }

    #[test]
    fn pattern_heavy_message_without_frequency_stays_below_threshold() {
        let (_, monitor) = monitor_at(T0);
        let scored = monitor.log_submission(submission_with_message(
            "198.51.100.6",
            T0,
            "BUY NOW http://spam.example BUY NOW http://spam.example",
        ));
        assert_eq!(scored.spam_score, 4);
        assert!(!scored.suspicious);
    }

    #[test]
    fn suspicious_activity_is_filtered_and_sorted() {
        let (clock, monitor) = monitor_at(T0);
        monitor.log_submission(clean_submission("198.51.100.7", T0));
        monitor.log_submission(submission_with_message(
            "198.51.100.8",
            T0,
            "bitcoin casino lottery crypto viagra cialis all mentioned here",
        ));
        clock.set(T0 + 1000);
        monitor.log_submission(submission_with_message(
            "198.51.100.9",
            T0 + 1000,
            "FREE $$$ click here now!!!!! http://scam.example \
             bitcoin casino lottery crypto viagra",
        ));

        let suspicious = monitor.suspicious_activity(24);
        assert_eq!(suspicious.len(), 2);
        assert!(suspicious.iter().all(|s| s.suspicious));
        assert!(suspicious[0].spam_score >= suspicious[1].spam_score);
        assert_eq!(suspicious[0].ip(), "198.51.100.9");
    }

    #[test]
    fn suspicious_activity_respects_hours_window() {
        let (clock, monitor) = monitor_at(T0);
        monitor.log_submission(submission_with_message(
            "198.51.100.10",
            T0,
            "bitcoin casino lottery crypto viagra cialis all mentioned here",
        ));

        clock.set(T0 + 3 * HOUR_MS);
        assert_eq!(monitor.suspicious_activity(24).len(), 1);
        assert_eq!(monitor.suspicious_activity(2).len(), 0);
        assert_eq!(monitor.suspicious_activity(-5).len(), 0);
    }

    #[test]
    fn stats_aggregates_counts_and_top_ips() {
        let (clock, monitor) = monitor_at(T0);
        for i in 0..3 {
            clock.set(T0 + i * 1000);
            monitor.log_submission(clean_submission("198.51.100.11", T0 + i * 1000));
        }
        clock.set(T0 + 4000);
        monitor.log_submission(clean_submission("198.51.100.12", T0 + 4000));
        monitor.block_email("Spammer@Example.com");

        let stats = monitor.stats();
        assert_eq!(stats.total_submissions, 4);
        assert_eq!(stats.last_24h, 4);
        assert_eq!(stats.suspicious, 0);
        assert_eq!(stats.blocked_emails, 1);
        assert_eq!(stats.top_ips[0], ("198.51.100.11".to_string(), 3));
        assert_eq!(stats.top_ips[1], ("198.51.100.12".to_string(), 1));
    }

    #[test]
    fn blocked_email_lookup_is_case_insensitive() {
        let (_, monitor) = monitor_at(T0);
        monitor.block_email("Foo@Bar.com");
        assert!(monitor.is_blocked_email("foo@BAR.com"));
        assert!(!monitor.is_blocked_email("other@bar.com"));

        // idempotent
        monitor.block_email("foo@bar.com");
        assert_eq!(monitor.stats().blocked_emails, 1);
    }

    #[test]
    fn manual_ip_block_applies_immediately() {
        let (_, monitor) = monitor_at(T0);
        assert!(!monitor.is_blocked_ip("203.0.113.50"));
        monitor.block_ip("203.0.113.50");
        assert!(monitor.is_blocked_ip("203.0.113.50"));
    }

    #[test]
    fn sweep_drops_expired_entries_but_keeps_totals() {
        let (clock, monitor) = monitor_at(T0);
        monitor.log_submission(clean_submission("198.51.100.13", T0));

        clock.set(T0 + 8 * 24 * HOUR_MS);
        assert_eq!(monitor.sweep(), 1);

        let stats = monitor.stats();
        assert_eq!(stats.total_submissions, 1);
        assert_eq!(stats.last_24h, 0);
        assert!(monitor.export().submissions.is_empty());
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let (_, monitor) = monitor_at(T0);
        let scored = monitor.log_submission(Submission {
            ip: String::new(),
            email: String::new(),
            name: String::new(),
            subject: String::new(),
            message: String::new(),
            timestamp: 0,
            user_agent: None,
        });
        // empty message: short-message penalty only
        assert_eq!(scored.spam_score, 2);
    }
}
