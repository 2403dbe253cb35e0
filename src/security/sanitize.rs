use once_cell::sync::Lazy;
use regex::Regex;

/// Inputs longer than this are rejected outright before any regex runs.
pub const MAX_INPUT_CHARS: usize = 10_000;

const SPAM_THRESHOLD: u32 = 4;

static FILTERED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(viagra|cialis|casino|poker|lottery|bitcoin|crypto)\b",
        r"(?i)\b(click here|visit now|amazing offer|limited time)\b",
        r"(?i)\b(make money|earn money|work from home|get rich)\b",
        r"https?://\S+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid filter pattern"))
    .collect()
});

static SPAM_SIGNALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[A-Z]{8,}",
        r"(?i)\b(CLICK|BUY|MONEY|FREE|URGENT|LIMITED|ACT NOW)\b",
        r"\$[0-9,]+",
        r"(?i)https?://\S+",
        r"(?i)\b(bitcoin|crypto|lottery|casino|viagra|cialis)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid spam signal"))
    .collect()
});

static PROTOCOL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(javascript|data|vbscript):").expect("valid protocol pattern"));
static EVENT_HANDLER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=\s*[^>\s]*").expect("valid handler pattern"));
static WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("valid whitespace pattern"));

/// Contact-form field sanitizer: strips HTML tags, encodes entities and
/// replaces spam vocabulary with `[FILTERED]`. Oversized input collapses to
/// an empty string.
pub fn sanitize_input(input: &str) -> String {
    if input.is_empty() || input.chars().count() > MAX_INPUT_CHARS {
        return String::new();
    }

    let mut sanitized = encode_entities(&strip_tags(input));
    for pattern in FILTERED_PATTERNS.iter() {
        sanitized = pattern.replace_all(&sanitized, "[FILTERED]").into_owned();
    }
    sanitized.trim().to_string()
}

/// Free-text sanitizer for AI-bound input: strips tags, encodes entities,
/// removes dangerous protocols and inline event handlers, collapses runs of
/// whitespace.
pub fn sanitize_chat_input(input: &str) -> String {
    if input.is_empty() || input.chars().count() > MAX_INPUT_CHARS {
        return String::new();
    }

    let mut sanitized = encode_entities(&strip_tags(input));
    sanitized = PROTOCOL_PATTERN.replace_all(&sanitized, "").into_owned();

    // nested handlers can re-form once an outer one is removed
    loop {
        let next = EVENT_HANDLER_PATTERN.replace_all(&sanitized, "").into_owned();
        if next.len() == sanitized.len() {
            break;
        }
        sanitized = next;
    }

    WHITESPACE_PATTERN
        .replace_all(&sanitized, " ")
        .trim()
        .to_string()
}

/// Additive spam-signal score with a fixed threshold. Empty or oversized
/// content is treated as spam.
pub fn is_spam_content(content: &str) -> bool {
    if content.is_empty() {
        return true;
    }
    let char_count = content.chars().count();
    if char_count > MAX_INPUT_CHARS {
        return true;
    }

    let mut score = 0u32;
    for pattern in SPAM_SIGNALS.iter() {
        score += pattern.find_iter(content).count() as u32;
    }
    score += count_repeat_runs(content, 7);

    if char_count < 2 {
        score += 2;
    }
    if char_count > 2000 {
        score += 3;
    }
    score += repeated_word_score(content);

    score >= SPAM_THRESHOLD
}

/// Maps internal failures to leak-free client strings. Anything touching
/// credentials or infrastructure collapses to a generic message.
pub fn safe_error_message(err: &anyhow::Error) -> &'static str {
    let message = err.to_string().to_lowercase();

    const SENSITIVE: [&str; 12] = [
        "api", "key", "token", "secret", "password", "credential", "auth", "bearer", "private",
        "internal", "config", "env",
    ];
    if SENSITIVE.iter().any(|s| message.contains(s)) {
        return "Service temporarily unavailable";
    }

    if message.contains("network") || message.contains("connect") {
        return "Network request failed";
    }
    if message.contains("rate limit") {
        return "Too many requests. Please try again later";
    }
    if message.contains("timeout") {
        return "Request timeout. Please try again";
    }
    if message.contains("not found") || message.contains("404") {
        return "Resource not found";
    }
    "An unexpected error occurred"
}

fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut inside_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => inside_tag = true,
            '>' if inside_tag => inside_tag = false,
            _ if !inside_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn encode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Number of maximal runs of one character repeated `run_len`+ times.
fn count_repeat_runs(text: &str, run_len: usize) -> u32 {
    let mut runs = 0u32;
    let mut prev: Option<char> = None;
    let mut current = 0usize;
    for ch in text.chars() {
        if Some(ch) == prev {
            current += 1;
        } else {
            if current >= run_len {
                runs += 1;
            }
            prev = Some(ch);
            current = 1;
        }
    }
    if current >= run_len {
        runs += 1;
    }
    runs
}

/// +2 for every word (longer than three characters) appearing more than
/// three times.
fn repeated_word_score(content: &str) -> u32 {
    use std::collections::HashMap;

    let mut counts: HashMap<&str, u32> = HashMap::new();
    let lowered = content.to_lowercase();
    for word in lowered.split_whitespace() {
        if word.chars().count() > 3 {
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    counts.values().filter(|&&c| c > 3).count() as u32 * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_input_strips_tags_and_encodes() {
        let out = sanitize_input("Hello <script>alert('x')</script> & goodbye");
        assert!(!out.contains('<'));
        assert!(out.contains("&amp;"));
        assert!(out.contains("alert(&#x27;x&#x27;)"));
    }

    #[test]
    fn sanitize_input_filters_spam_vocabulary() {
        let out = sanitize_input("get rich with bitcoin at https://scam.example now");
        assert!(out.contains("[FILTERED]"));
        assert!(!out.contains("bitcoin"));
        assert!(!out.contains("https://"));
    }

    #[test]
    fn sanitize_input_rejects_oversized_payloads() {
        let big = "a".repeat(MAX_INPUT_CHARS + 1);
        assert_eq!(sanitize_input(&big), "");
    }

    #[test]
    fn sanitize_chat_input_removes_protocols_and_handlers() {
        let out = sanitize_chat_input("javascript:alert(1) onclick=steal() hello   world");
        assert!(!out.to_lowercase().contains("javascript:"));
        assert!(!out.to_lowercase().contains("onclick"));
        assert!(out.contains("hello world"));
    }

    #[test]
    fn clean_email_text_is_not_spam() {
        assert!(!is_spam_content(
            "Hi team, following up on yesterday's meeting about the rollout schedule."
        ));
    }

    #[test]
    fn four_signals_cross_the_threshold() {
        // CLICK + BUY + MONEY + FREE keyword hits
        assert!(is_spam_content("CLICK to BUY, easy MONEY, all FREE"));
        // three hits only: still clean
        assert!(!is_spam_content("CLICK to BUY, easy MONEY today ok"));
    }

    #[test]
    fn empty_and_oversized_content_is_spam() {
        assert!(is_spam_content(""));
        assert!(is_spam_content(&"a".repeat(MAX_INPUT_CHARS + 1)));
    }

    #[test]
    fn repeated_words_and_runs_contribute() {
        assert_eq!(count_repeat_runs("aaaaaaa bbb aaaaaaaa", 7), 2);
        // "offer" four times -> +2, plus URL and $100 -> 4 total
        assert!(is_spam_content(
            "offer offer offer offer https://x.example $100"
        ));
    }

    #[test]
    fn safe_error_message_hides_sensitive_details() {
        let err = anyhow::anyhow!("Groq API key not configured");
        assert_eq!(safe_error_message(&err), "Service temporarily unavailable");

        let err = anyhow::anyhow!("operation timeout after 10s");
        assert_eq!(safe_error_message(&err), "Request timeout. Please try again");
    }
}
