use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    ai::GroqClient,
    config::AppConfig,
    domain::{EmailAnalysis, Tone},
    infrastructure::clock::Clock,
    limiter::UsageLimiter,
    monitor::ContactMonitor,
    security::{RequestRateLimiter, SubmissionTracker},
};

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub monitor: Arc<ContactMonitor>,
    pub usage_limiter: Arc<UsageLimiter>,
    pub request_limiter: Arc<RequestRateLimiter>,
    pub tracker: Arc<SubmissionTracker>,
    pub groq: Arc<GroqClient>,
}

/// Contact-form body. Every field is defaulted so presence checks produce
/// the form-level error message instead of a deserializer error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Hidden field; humans leave it empty.
    #[serde(default)]
    pub honeypot: Option<String>,
    /// Client-side render time, ms since epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    pub action: Option<String>,
    pub hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AdminActionRequest {
    pub action: Option<String>,
    pub ip: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    #[serde(default)]
    pub email: String,
    pub tone: Tone,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub rewritten_email: String,
    pub remaining: u32,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: EmailAnalysis,
    pub remaining: u32,
    pub success: bool,
}
