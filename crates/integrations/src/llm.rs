//! LLM provider clients behind a common [`TextGenerator`] trait.

use async_trait::async_trait;
use rankforge_core::llm::{LlmProvider, Prompt};
use serde_json::json;

use crate::error::{json_body, parse_error, IntegrationError};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// API version header required by the Anthropic messages endpoint.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Produces text from a system + user prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> LlmProvider;

    async fn generate(&self, prompt: &Prompt, max_tokens: u32) -> Result<String, IntegrationError>;
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: LlmProvider::Openai.default_model().to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Openai
    }

    async fn generate(&self, prompt: &Prompt, max_tokens: u32) -> Result<String, IntegrationError> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let body = json_body("openai", response).await?;
        parse_openai_completion(&body)
    }
}

/// Text of the first choice of a chat completion.
pub fn parse_openai_completion(body: &serde_json::Value) -> Result<String, IntegrationError> {
    body.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| parse_error("openai", "completion has no content"))
}

// ---------------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------------

pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: LlmProvider::Anthropic.default_model().to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Anthropic
    }

    async fn generate(&self, prompt: &Prompt, max_tokens: u32) -> Result<String, IntegrationError> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "system": prompt.system,
            "messages": [{"role": "user", "content": prompt.user}],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let body = json_body("anthropic", response).await?;
        parse_anthropic_message(&body)
    }
}

/// Concatenated text blocks of a messages response.
pub fn parse_anthropic_message(body: &serde_json::Value) -> Result<String, IntegrationError> {
    let blocks = body
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| parse_error("anthropic", "response has no content array"))?;

    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(parse_error("anthropic", "response has no text"));
    }
    Ok(text.to_string())
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Base URLs for each provider; overridable for tests.
#[derive(Debug, Clone)]
pub struct LlmEndpoints {
    pub openai: String,
    pub anthropic: String,
}

impl Default for LlmEndpoints {
    fn default() -> Self {
        Self {
            openai: OPENAI_BASE_URL.to_string(),
            anthropic: ANTHROPIC_BASE_URL.to_string(),
        }
    }
}

/// Build the client for `provider` using `api_key`.
pub fn generator_for(
    provider: LlmProvider,
    client: reqwest::Client,
    endpoints: &LlmEndpoints,
    api_key: &str,
) -> Box<dyn TextGenerator> {
    match provider {
        LlmProvider::Openai => Box::new(OpenAiClient::new(client, &endpoints.openai, api_key)),
        LlmProvider::Anthropic => {
            Box::new(AnthropicClient::new(client, &endpoints.anthropic, api_key))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn openai_completion_text_is_extracted() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "  # Brief\n"}}]});
        assert_eq!(parse_openai_completion(&body).unwrap(), "# Brief");
    }

    #[test]
    fn empty_openai_completion_is_an_error() {
        assert!(parse_openai_completion(&json!({"choices": []})).is_err());
        let blank = json!({"choices": [{"message": {"content": "   "}}]});
        assert!(parse_openai_completion(&blank).is_err());
    }

    #[test]
    fn anthropic_text_blocks_are_joined() {
        let body = json!({
            "content": [
                {"type": "text", "text": "Part one. "},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "Part two."}
            ]
        });
        assert_eq!(parse_anthropic_message(&body).unwrap(), "Part one. Part two.");
    }

    #[test]
    fn factory_returns_requested_provider() {
        let client = reqwest::Client::new();
        let endpoints = LlmEndpoints::default();
        let generator = generator_for(LlmProvider::Anthropic, client, &endpoints, "k");
        assert_eq!(generator.provider(), LlmProvider::Anthropic);
    }
}
