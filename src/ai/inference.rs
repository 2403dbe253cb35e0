use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{EmailAnalysis, Tone};

use super::prompts::{tone_prompt, ANALYZE_PROMPT};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub fn build_rewrite_request(model: String, email: &str, tone: Tone) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: tone_prompt(tone).into(),
            },
            ChatMessage {
                role: "user".into(),
                content: format!(
                    "Original email:\n\n{email}\n\nPlease rewrite this email according to the instructions."
                ),
            },
        ],
        temperature: 0.7,
        top_p: 1.0,
        max_tokens: 1000,
        stream: false,
    }
}

pub fn build_analyze_request(
    model: String,
    email: &str,
    context: Option<&str>,
) -> ChatCompletionRequest {
    let mut system_prompt = ANALYZE_PROMPT.to_string();
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        system_prompt.push_str(
            "\n\nIMPORTANT CONTEXT TO USE (this is custom knowledge provided by the user - \
             incorporate it naturally into your analysis and responses):\n",
        );
        system_prompt.push_str(context);
    }

    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system".into(),
                content: system_prompt,
            },
            ChatMessage {
                role: "user".into(),
                content: format!("Analyze this email and provide response options:\n\n{email}"),
            },
        ],
        temperature: 0.7,
        top_p: 1.0,
        max_tokens: 2000,
        stream: false,
    }
}

pub fn extract_content(completion: ChatCompletionResponse) -> Result<String> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .context("Groq response did not contain any choices")?;

    choice
        .message
        .and_then(|msg| msg.content)
        .context("Groq response missing message content")
}

/// Models wrap JSON in markdown fences often enough that the original strips
/// them before parsing; do the same.
pub fn parse_analysis(content: &str) -> Result<EmailAnalysis> {
    let cleaned = content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string();
    let analysis: EmailAnalysis =
        serde_json::from_str(&cleaned).context("Groq analysis was not valid JSON")?;
    Ok(analysis)
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: i32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_request_carries_tone_prompt_and_email() {
        let request = build_rewrite_request("openai/gpt-oss-120b".into(), "Fix this!", Tone::Professional);
        assert_eq!(request.model, "openai/gpt-oss-120b");
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains("professional"));
        assert!(request.messages[1].content.contains("Fix this!"));
        assert_eq!(request.max_tokens, 1000);
    }

    #[test]
    fn analyze_request_appends_context_when_present() {
        let with = build_analyze_request("m".into(), "Hello", Some("We ship on Fridays"));
        assert!(with.messages[0].content.contains("We ship on Fridays"));
        assert_eq!(with.max_tokens, 2000);

        let without = build_analyze_request("m".into(), "Hello", None);
        assert!(!without.messages[0].content.contains("IMPORTANT CONTEXT"));
    }

    #[test]
    fn extract_content_requires_choices_and_content() {
        let empty = ChatCompletionResponse { choices: vec![] };
        assert!(extract_content(empty).is_err());

        let missing = ChatCompletionResponse {
            choices: vec![ChatChoice { message: None }],
        };
        assert!(extract_content(missing).is_err());

        let ok = ChatCompletionResponse {
            choices: vec![ChatChoice {
                message: Some(ChatCompletionMessage {
                    content: Some("rewritten".into()),
                }),
            }],
        };
        assert_eq!(extract_content(ok).unwrap(), "rewritten");
    }

    #[test]
    fn parse_analysis_strips_markdown_fences() {
        let raw = "```json\n{\"summary\":\"s\",\"sentiment\":\"neutral\",\
                   \"keyPoints\":[\"k\"],\"responseOptions\":[{\"id\":\"1\",\
                   \"tone\":\"Friendly\",\"content\":\"c\"}]}\n```";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.summary, "s");
        assert_eq!(analysis.response_options.len(), 1);
    }

    #[test]
    fn parse_analysis_rejects_prose() {
        assert!(parse_analysis("Sorry, I cannot help with that.").is_err());
    }
}
