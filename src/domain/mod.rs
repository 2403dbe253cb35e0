pub mod submission;
pub mod types;

pub use submission::{ScoredSubmission, Submission};
pub use types::{ContactStats, EmailAnalysis, MonitorExport, RateDecision, Tone};
