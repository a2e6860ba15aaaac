// OpenAI-compatible completion client
//
// Implements modelgate_core::CompletionClient against the
// `/chat/completions` endpoint. Works with OpenAI and any compatible server
// (Ollama, vLLM, gateways) through a custom base URL.

mod client;
mod types;


pub use client::{OpenAiClient, DEFAULT_BASE_URL};
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
