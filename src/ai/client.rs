use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::{
    config::GroqConfig,
    domain::{EmailAnalysis, Tone},
};

use super::inference::{
    build_analyze_request, build_rewrite_request, extract_content, parse_analysis,
    ChatCompletionRequest, ChatCompletionResponse, GROQ_API_URL,
};

#[derive(Clone)]
pub struct GroqClient {
    http: Client,
    config: GroqConfig,
}

impl GroqClient {
    pub fn new(http: Client, config: GroqConfig) -> Self {
        Self { http, config }
    }

    /// Rewrites an email in the requested tone. Returns the trimmed model
    /// output.
    pub async fn rewrite(&self, email: &str, tone: Tone) -> Result<String> {
        let request = build_rewrite_request(self.config.model.clone(), email, tone);
        let content = self.complete(request).await?;
        Ok(content.trim().to_string())
    }

    /// Analyzes an email into the structured summary/sentiment/options shape,
    /// with optional caller-provided context folded into the system prompt.
    pub async fn analyze(&self, email: &str, context: Option<&str>) -> Result<EmailAnalysis> {
        let request = build_analyze_request(self.config.model.clone(), email, context);
        let content = self.complete(request).await?;
        parse_analysis(&content)
    }

    async fn complete(&self, request: ChatCompletionRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .context("GROQ_API_KEY must be configured for AI email tools")?;

        let response = self
            .http
            .post(GROQ_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| anyhow!("Groq API request failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(target: "ai", %status, detail = %detail, "Groq API returned an error");
            return Err(anyhow!("Groq API error: {status}"));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        extract_content(completion)
    }
}
