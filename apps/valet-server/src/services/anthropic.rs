//! Text generation through the Anthropic Messages API.
//!
//! Sends the standup notes as one user message with a text block per note
//! and concatenates the text blocks of the reply.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::config::AnthropicConfig;
use crate::error::ServerError;

use super::TextGenerator;

/// Completion budget for a summary.
const MAX_TOKENS: u32 = 4096;

/// Client for the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    config: AnthropicConfig,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, texts: &[String]) -> Result<String, ServerError> {
        let content: Vec<serde_json::Value> = texts
            .iter()
            .map(|text| serde_json::json!({"type": "text", "text": text}))
            .collect();
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": content}],
        });

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| ServerError::Generation(format!("messages request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ServerError::Generation(format!(
                "messages request returned {status}: {message}"
            )));
        }

        let parsed: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| ServerError::Generation(format!("messages response parse failed: {e}")))?;

        info!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "token usage"
        );

        Ok(parsed
            .content
            .into_iter()
            .map(|block| block.text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .concat())
    }
}
