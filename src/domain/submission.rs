use serde::{Deserialize, Serialize};

/// A contact-form submission as handed over by the HTTP layer. The timestamp
/// is supplied by the caller, in milliseconds since the epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub ip: String,
    pub email: String,
    pub name: String,
    pub subject: String,
    pub message: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// A submission plus its derived risk attributes. Immutable once created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub spam_score: u32,
    pub suspicious: bool,
}

impl ScoredSubmission {
    pub fn ip(&self) -> &str {
        &self.submission.ip
    }

    pub fn timestamp(&self) -> i64 {
        self.submission.timestamp
    }
}
