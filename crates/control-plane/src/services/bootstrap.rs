// First-start migration from single-key deployments
//
// Older deployments configured one OpenAI key through the environment. On the
// first start against an empty store that key becomes the default
// configuration, sealed like any other credential.

use modelgate_core::{ConfigError, ModelConfig, ModelConfigInput, ProviderType, Result};
use modelgate_openai::DEFAULT_BASE_URL;

use super::ModelConfigService;

pub const BOOTSTRAP_CONFIG_NAME: &str = "Default";
pub const BOOTSTRAP_MODEL_ID: &str = "gpt-4o-mini";

/// Plaintext OpenAI credential supplied by environment
#[derive(Clone)]
pub struct LegacyCredential {
    pub api_key: String,
    /// None falls back to the public OpenAI endpoint
    pub base_url: Option<String>,
}

impl std::fmt::Debug for LegacyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyCredential")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// The store already held configurations (or another process won the race)
    AlreadyConfigured,
    NoLegacyCredential,
    Created(ModelConfig),
}

/// Create the default configuration from a legacy credential when the store
/// is empty. Safe to run on every start.
pub async fn bootstrap(
    service: &ModelConfigService,
    legacy: Option<&LegacyCredential>,
) -> Result<BootstrapOutcome> {
    let existing = service.count().await?;
    if existing > 0 {
        tracing::debug!(existing, "Model configurations present, skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyConfigured);
    }

    let Some(legacy) = legacy.filter(|l| !l.api_key.is_empty()) else {
        tracing::info!("No legacy OPENAI_API_KEY set, starting with no model configurations");
        return Ok(BootstrapOutcome::NoLegacyCredential);
    };

    let input = ModelConfigInput {
        name: BOOTSTRAP_CONFIG_NAME.to_string(),
        provider: ProviderType::Openai,
        base_url: legacy
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        model_id: BOOTSTRAP_MODEL_ID.to_string(),
        api_key: legacy.api_key.clone(),
        is_default: true,
    };

    match service.create(input).await {
        Ok(config) => {
            tracing::info!(id = %config.id, "Migrated legacy OPENAI_API_KEY into default model configuration");
            Ok(BootstrapOutcome::Created(config))
        }
        // A concurrent start created it first
        Err(ConfigError::DuplicateName(_)) => {
            tracing::info!("Default model configuration created by another instance");
            Ok(BootstrapOutcome::AlreadyConfigured)
        }
        Err(e) => Err(e),
    }
}
