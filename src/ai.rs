//! AI integration: the client trait, the Anthropic provider, and the
//! grouping oracle that partitions diff units into commit groups.

pub mod anthropic;
pub mod error;
pub mod grouping;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_utils;

pub use anthropic::AnthropicClient;
pub use error::OracleError;
pub use grouping::{GroupingClient, UnitGroup};

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

/// HTTP request timeout for AI API calls.
///
/// Set to 5 minutes to accommodate large diffs and long model responses
/// while preventing indefinite hangs.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for AI service clients.
///
/// The grouping oracle depends only on this narrow contract, so the
/// actual model or provider can be swapped without touching the
/// grouping, repair, or apply logic.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the raw response text.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;
}

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Checks an HTTP response for error status and returns a structured error
/// if non-success.
///
/// On success, returns the response unchanged for further processing.
pub(crate) async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(OracleError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into())
}
