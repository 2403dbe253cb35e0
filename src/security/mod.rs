use once_cell::sync::Lazy;
use regex::Regex;

pub mod request_rate;
pub mod sanitize;
pub mod tracker;

pub use request_rate::RequestRateLimiter;
pub use sanitize::{is_spam_content, safe_error_message, sanitize_chat_input, sanitize_input};
pub use tracker::{SubmissionDenial, SubmissionTracker};

/// IPv6 textual form tops out at 45 characters.
pub const MAX_IP_LENGTH: usize = 45;
pub const MAX_EMAIL_LENGTH: usize = 254;

// bounded quantifiers keep this pattern linear on hostile input
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]{1,64}@[a-zA-Z0-9.-]{1,253}\.[a-zA-Z]{2,}$")
        .expect("valid email pattern")
});

/// Accepts IPv4 and IPv6 literals only.
pub fn is_valid_ip(value: &str) -> bool {
    value.len() <= MAX_IP_LENGTH && value.parse::<std::net::IpAddr>().is_ok()
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= MAX_EMAIL_LENGTH && EMAIL_PATTERN.is_match(value)
}
