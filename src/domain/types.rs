use serde::{Deserialize, Serialize};

use crate::domain::ScoredSubmission;

/// Outcome of a usage-limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Aggregate monitoring counters for the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total_submissions: u64,
    pub last_24h: usize,
    pub suspicious: usize,
    #[serde(rename = "blockedIPs")]
    pub blocked_ips: usize,
    pub blocked_emails: usize,
    /// Top ten submitting IPs of the last 24 hours, descending by count.
    #[serde(rename = "topIPs")]
    pub top_ips: Vec<(String, u64)>,
}

/// Full dump of the monitor state, for offline analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorExport {
    pub submissions: Vec<ScoredSubmission>,
    #[serde(rename = "blockedIPs")]
    pub blocked_ips: Vec<String>,
    pub blocked_emails: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Empathetic,
    Assertive,
}

/// Structured analyzer output parsed from the model's JSON reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysis {
    pub summary: String,
    pub sentiment: String,
    pub key_points: Vec<String>,
    pub response_options: Vec<ResponseOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOption {
    pub id: String,
    pub tone: String,
    pub content: String,
}
