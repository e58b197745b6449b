//! Anthropic Messages API client implementation.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ai::{build_http_client, check_error_response, error::OracleError, AiClient};

/// Default model when neither the CLI flag nor settings specify one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic API request message.
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API request body.
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: i32,
    system: String,
    messages: Vec<Message>,
}

/// Anthropic API response content.
#[derive(Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

/// Anthropic API response.
#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

/// AI client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    /// Creates a new client for the given model and API key.
    pub fn new(model: String, api_key: String) -> Result<Self> {
        let client = build_http_client()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    /// Model-specific output token limit.
    fn get_max_tokens(&self) -> i32 {
        if self.model.contains("haiku") {
            4096
        } else {
            8192
        }
    }
}

impl AiClient for AnthropicClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let request = AnthropicRequest {
                model: self.model.clone(),
                max_tokens: self.get_max_tokens(),
                system: system_prompt.to_string(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                }],
            };

            let response = self
                .client
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| OracleError::NetworkError(e.to_string()))?;

            let response = check_error_response(response).await?;

            let api_response: AnthropicResponse = response
                .json()
                .await
                .map_err(|e| OracleError::InvalidResponseFormat(e.to_string()))?;

            let text = api_response
                .content
                .first()
                .filter(|c| c.content_type == "text")
                .map(|c| c.text.clone())
                .ok_or_else(|| {
                    OracleError::InvalidResponseFormat("No text content in response".to_string())
                })?;

            tracing::debug!(response_len = text.len(), "Received Anthropic response");
            Ok(text)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn max_tokens_by_model_family() {
        let haiku =
            AnthropicClient::new("claude-3-5-haiku-latest".to_string(), "key".to_string()).unwrap();
        let sonnet = AnthropicClient::new(DEFAULT_MODEL.to_string(), "key".to_string()).unwrap();
        assert_eq!(haiku.get_max_tokens(), 4096);
        assert_eq!(sonnet.get_max_tokens(), 8192);
    }
}
