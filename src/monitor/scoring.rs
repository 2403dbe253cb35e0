use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Submission;

/// Scores above this are flagged suspicious (strictly greater).
pub const SUSPICIOUS_THRESHOLD: u32 = 5;
/// Scores above this auto-block the submitting IP (strictly greater).
pub const AUTO_BLOCK_THRESHOLD: u32 = 10;

pub const FREQUENCY_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

const SHORT_MESSAGE_CHARS: usize = 20;
const LONG_MESSAGE_CHARS: usize = 2000;
const REPEAT_RUN_LEN: usize = 5;

static SPAM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(viagra|cialis|casino|lottery|bitcoin|crypto)\b",
        r"(?i)\b(buy now|click here|visit now|amazing offer|limited time)\b",
        r"(?i)https?://[^\s]+",
        r"\$[0-9,]+",
        // applied to the raw text so SHOUTED words still register
        r"[A-Z]{5,}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid spam pattern"))
    .collect()
});

/// Heuristic spam score for a submission, given how many prior submissions
/// the same IP made inside the trailing 24 hours. Total over all inputs;
/// never fails.
pub fn calculate_spam_score(data: &Submission, prior_from_ip: usize) -> u32 {
    let mut score = (prior_from_ip as u32).saturating_mul(2);

    let content = format!("{} {} {}", data.name, data.subject, data.message);
    for pattern in SPAM_PATTERNS.iter() {
        score += pattern.find_iter(&content).count() as u32;
    }

    let message_chars = data.message.chars().count();
    if message_chars < SHORT_MESSAGE_CHARS {
        score += 2;
    }
    if message_chars > LONG_MESSAGE_CHARS {
        score += 3;
    }

    if has_repeated_run(&content, REPEAT_RUN_LEN) {
        score += 3;
    }

    score
}

/// True when any character repeats `run_len`+ times consecutively,
/// case-insensitively. The regex crate has no backreferences, so this is a
/// plain scan.
pub fn has_repeated_run(text: &str, run_len: usize) -> bool {
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if Some(ch) == prev {
            run += 1;
        } else {
            prev = Some(ch);
            run = 1;
        }
        if run >= run_len {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(message: &str) -> Submission {
        Submission {
            ip: "203.0.113.7".into(),
            email: "someone@example.com".into(),
            name: "Jane Doe".into(),
            subject: "Question about your work".into(),
            message: message.into(),
            timestamp: 1_700_000_000_000,
            user_agent: None,
        }
    }

    #[test]
    fn clean_message_scores_zero() {
        let sub = submission("Hello, I would like to talk about a project.");
        assert_eq!(calculate_spam_score(&sub, 0), 0);
    }

    #[test]
    fn each_prior_submission_adds_two() {
        let sub = submission("Hello, I would like to talk about a project.");
        assert_eq!(calculate_spam_score(&sub, 3), 6);
    }

    #[test]
    fn url_and_keyword_matches_compound() {
        // two URLs + two call-to-action hits, nothing else
        let sub = submission("BUY NOW http://spam.example BUY NOW http://spam.example");
        assert_eq!(calculate_spam_score(&sub, 0), 4);
    }

    #[test]
    fn short_and_long_messages_are_penalized() {
        let sub = submission("too short message..");
        assert_eq!(calculate_spam_score(&sub, 0), 2);

        let long = "word ".repeat(500);
        let sub = submission(&long);
        assert_eq!(calculate_spam_score(&sub, 0), 3);
    }

    #[test]
    fn repeated_characters_add_three() {
        let sub = submission("Hello!!!!! I really need this answered quickly.");
        assert_eq!(calculate_spam_score(&sub, 0), 3);
    }

    #[test]
    fn repeated_run_is_case_insensitive() {
        assert!(has_repeated_run("aAaAa", 5));
        assert!(has_repeated_run("xxxxx", 5));
        assert!(!has_repeated_run("xxxx", 5));
        assert!(!has_repeated_run("ababab", 5));
    }

    #[test]
    fn uppercase_runs_count_per_occurrence() {
        let sub = submission("URGENT OFFER please read this message carefully");
        // URGENT (6 caps) and OFFER (5 caps) each match once
        assert_eq!(calculate_spam_score(&sub, 0), 2);
    }

    #[test]
    fn dollar_amounts_match() {
        let sub = submission("I will pay you $1,000 for this work right away.");
        assert_eq!(calculate_spam_score(&sub, 0), 1);
    }
}
