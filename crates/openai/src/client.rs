// OpenAI-compatible client implementation

use async_trait::async_trait;
use modelgate_core::{CompletionClient, CompletionError, CompletionRequest};
use reqwest::Client;

use crate::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Endpoint used when a configuration leaves the base URL empty
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// Upstream error bodies can be large HTML pages
const MAX_ERROR_BODY: usize = 1000;

/// Client for OpenAI-compatible chat completion APIs.
///
/// Holds no credentials: the key and base URL travel with each request, so
/// one client can serve any number of transient profiles.
#[derive(Clone, Default)]
pub struct OpenAiClient {
    client: Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient").finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Use a preconfigured reqwest client (proxies, custom TLS)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Full completions URL for a base URL (empty means the default endpoint)
    pub fn completions_url(base_url: &str) -> String {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim()
        };
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let url = Self::completions_url(&request.base_url);

        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            max_tokens: request.max_tokens,
            stream: false,
        };

        let mut builder = self
            .client
            .post(&url)
            .json(&body);

        // Keyless local servers get no Authorization header at all
        if !request.api_key.is_empty() {
            builder = builder.bearer_auth(&request.api_key);
        }

        tracing::debug!(url = %url, model = %request.model, "sending completion request");

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let mut error_text = response.text().await.unwrap_or_default();
            if error_text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| error_text.is_char_boundary(*i))
                    .unwrap_or(0);
                error_text.truncate(cut);
            }
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let parsed: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| CompletionError::Transport {
                    timeout: e.is_timeout(),
                    message: format!("Failed to parse completion response: {}", e.without_url()),
                })?;

        Ok(parsed.text())
    }
}

// The request URL is dropped from the message: port numbers and paths must not
// feed the status markers used to classify failures.
fn transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_builder() {
        return CompletionError::Client(e.without_url().to_string());
    }
    let timeout = e.is_timeout();
    CompletionError::Transport {
        message: e.without_url().to_string(),
        timeout,
    }
}
