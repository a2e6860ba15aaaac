// Outbound LLM call abstraction
//
// The chat-completion collaborator is opaque to this crate. The prober only
// needs one request/response round trip, so the trait is a single method.

use async_trait::async_trait;
use thiserror::Error;

/// One minimal, non-streaming completion request
#[derive(Clone)]
pub struct CompletionRequest {
    /// Empty means the client's default endpoint
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Errors reported by the completion collaborator
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The API answered with a non-success status
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response
    #[error("request failed: {message}")]
    Transport { message: String, timeout: bool },

    /// Client could not be constructed (bad base URL, TLS setup)
    #[error("failed to create LLM client: {0}")]
    Client(String),
}

impl CompletionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CompletionError::Transport { timeout: true, .. })
    }
}

/// A client able to issue a single chat completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the request; returns the assistant text on success
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
