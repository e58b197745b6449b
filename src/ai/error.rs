//! AI-specific error handling.

use thiserror::Error;

/// Failures at the AI oracle boundary.
///
/// Not retried automatically; the CLI decides whether to ask the user to
/// try again.
#[derive(Error, Debug)]
pub enum OracleError {
    /// API key not found in environment variables or settings.
    #[error(
        "AI API key not found. Set ANTHROPIC_API_KEY or CLAUDE_API_KEY environment variable"
    )]
    ApiKeyNotFound,

    /// AI API request failed with error message.
    #[error("AI API request failed: {0}")]
    ApiRequestFailed(String),

    /// Invalid response format from the AI API.
    #[error("Invalid response format from AI API: {0}")]
    InvalidResponseFormat(String),

    /// Response parsed but contained no usable commit groups.
    #[error("AI response contained no usable commit groups")]
    NoUsableGroups,

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}

// Note: anyhow already has a blanket impl for thiserror::Error types
