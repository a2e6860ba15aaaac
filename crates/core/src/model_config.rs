// Model configuration entity types
//
// ModelConfig is the client-safe projection of a stored configuration row.
// It deliberately has no credential field: the sealed key never leaves the
// storage layer, and the plaintext only exists in ResolvedModelConfig, which
// is not serializable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{ConfigError, Result};

/// LLM provider tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    Openai,
    Anthropic,
    /// OpenAI-compatible endpoint (Ollama, vLLM, gateways)
    Custom,
}

impl ProviderType {
    /// Whether a configuration for this provider must carry an API key.
    /// Custom endpoints are often local servers that accept any key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderType::Custom)
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::Openai => write!(f, "openai"),
            ProviderType::Anthropic => write!(f, "anthropic"),
            ProviderType::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderType::Openai),
            "anthropic" => Ok(ProviderType::Anthropic),
            "custom" => Ok(ProviderType::Custom),
            _ => Err(format!("Unknown provider type: {}", s)),
        }
    }
}

/// Model configuration as returned to clients (API key never exposed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: Uuid,
    pub name: String,
    pub provider: ProviderType,
    /// Empty means the provider's default endpoint
    pub base_url: String,
    pub model_id: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable fields for create and update (update is a full replace)
#[derive(Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ModelConfigInput {
    /// Unique, human-readable name.
    #[cfg_attr(feature = "openapi", schema(example = "Production GPT-4o"))]
    pub name: String,
    pub provider: ProviderType,
    /// Base URL of an OpenAI-compatible API. Leave empty for the provider default.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "https://api.openai.com/v1"))]
    pub base_url: String,
    /// Model identifier passed to the provider API.
    #[cfg_attr(feature = "openapi", schema(example = "gpt-4o-mini"))]
    pub model_id: String,
    /// Plaintext API key. Sealed before storage and never returned.
    #[serde(default)]
    pub api_key: String,
    /// Whether this configuration becomes the default. Only one can be.
    #[serde(default)]
    pub is_default: bool,
}

impl ModelConfigInput {
    /// Check required fields before anything is sealed or written
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation("name is required"));
        }
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::validation("modelId is required"));
        }
        if self.api_key.is_empty() && self.provider.requires_api_key() {
            return Err(ConfigError::validation(format!(
                "apiKey is required for provider '{}'",
                self.provider
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ModelConfigInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfigInput")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// Configuration with its decrypted API key, for the chat-completion caller.
///
/// Internal only: not serializable, and `Debug` hides the key.
#[derive(Clone)]
pub struct ResolvedModelConfig {
    pub id: Uuid,
    pub name: String,
    pub provider: ProviderType,
    pub base_url: String,
    pub model_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for ResolvedModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedModelConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
