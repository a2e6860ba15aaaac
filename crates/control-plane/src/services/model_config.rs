// Model configuration service for business logic
//
// All plaintext credentials enter here and are sealed before the storage
// backend sees them. Every value leaving the service goes through
// row_to_config, which has no credential field to copy.

use std::sync::Arc;

use modelgate_core::{
    ConfigError, ModelConfig, ModelConfigInput, ProviderType, ResolvedModelConfig, Result,
};
use modelgate_storage::{
    EncryptionService, ModelConfigRow, ModelConfigWrite, StorageBackend, UsageCounter,
};
use uuid::Uuid;

pub struct ModelConfigService {
    db: StorageBackend,
    encryption: Arc<EncryptionService>,
    usage: Arc<dyn UsageCounter>,
}

impl ModelConfigService {
    pub fn new(
        db: StorageBackend,
        encryption: Arc<EncryptionService>,
        usage: Arc<dyn UsageCounter>,
    ) -> Self {
        Self {
            db,
            encryption,
            usage,
        }
    }

    pub async fn create(&self, input: ModelConfigInput) -> Result<ModelConfig> {
        let write = self.seal_input(input)?;
        let row = self.db.create_model_config(write).await?;

        tracing::info!(
            id = %row.id,
            name = %row.name,
            provider = %row.provider,
            is_default = row.is_default,
            "Created model configuration"
        );
        Ok(Self::row_to_config(&row))
    }

    pub async fn get(&self, id: Uuid) -> Result<ModelConfig> {
        let row = self.fetch(id).await?;
        Ok(Self::row_to_config(&row))
    }

    pub async fn list(&self) -> Result<Vec<ModelConfig>> {
        let rows = self.db.list_model_configs().await?;
        Ok(rows.iter().map(Self::row_to_config).collect())
    }

    /// Full replace. The credential is re-sealed under a fresh nonce every time.
    pub async fn update(&self, id: Uuid, input: ModelConfigInput) -> Result<ModelConfig> {
        let write = self.seal_input(input)?;
        let row = self
            .db
            .update_model_config(id, write)
            .await?
            .ok_or(ConfigError::NotFound(id))?;

        tracing::info!(id = %row.id, name = %row.name, is_default = row.is_default, "Updated model configuration");
        Ok(Self::row_to_config(&row))
    }

    /// Delete unless usage records still reference the configuration.
    ///
    /// The usage check and the delete are separate statements; a reference
    /// recorded between them is not seen.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.fetch(id).await?;

        let references = self.usage.count_references(id).await.map_err(|e| {
            tracing::error!(id = %id, error = %e, "Usage check failed before delete");
            ConfigError::CheckFailed(e.to_string())
        })?;

        if references > 0 {
            tracing::info!(id = %id, references, "Refusing to delete model configuration in use");
            return Err(ConfigError::InUse { id, references });
        }

        if !self.db.delete_model_config(id).await? {
            return Err(ConfigError::NotFound(id));
        }

        tracing::info!(id = %id, "Deleted model configuration");
        Ok(())
    }

    pub async fn get_default(&self) -> Result<Option<ModelConfig>> {
        let row = self.db.get_default_model_config().await?;
        Ok(row.as_ref().map(Self::row_to_config))
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.db.count_model_configs().await?)
    }

    /// Configuration with its decrypted credential, for outbound LLM calls
    pub async fn resolve(&self, id: Uuid) -> Result<ResolvedModelConfig> {
        let row = self.fetch(id).await?;
        self.resolve_row(row)
    }

    pub async fn resolve_default(&self) -> Result<Option<ResolvedModelConfig>> {
        match self.db.get_default_model_config().await? {
            Some(row) => self.resolve_row(row).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch(&self, id: Uuid) -> Result<ModelConfigRow> {
        self.db
            .get_model_config(id)
            .await?
            .ok_or(ConfigError::NotFound(id))
    }

    fn resolve_row(&self, row: ModelConfigRow) -> Result<ResolvedModelConfig> {
        let api_key = self.encryption.open_credential(&row.api_key).map_err(|e| {
            tracing::error!(id = %row.id, error = %e, "Stored credential could not be opened");
            e
        })?;

        Ok(ResolvedModelConfig {
            id: row.id,
            provider: Self::parse_provider(&row.provider),
            name: row.name,
            base_url: row.base_url,
            model_id: row.model_id,
            api_key,
        })
    }

    fn seal_input(&self, input: ModelConfigInput) -> Result<ModelConfigWrite> {
        input.validate()?;
        let api_key = self.encryption.seal_credential(&input.api_key)?;

        Ok(ModelConfigWrite {
            name: input.name.trim().to_string(),
            provider: input.provider.to_string(),
            base_url: input.base_url.trim().to_string(),
            model_id: input.model_id.trim().to_string(),
            api_key,
            is_default: input.is_default,
        })
    }

    fn parse_provider(provider: &str) -> ProviderType {
        provider.parse().unwrap_or(ProviderType::Custom)
    }

    /// Masked projection: every field except the credential
    pub fn row_to_config(row: &ModelConfigRow) -> ModelConfig {
        ModelConfig {
            id: row.id,
            name: row.name.clone(),
            provider: Self::parse_provider(&row.provider),
            base_url: row.base_url.clone(),
            model_id: row.model_id.clone(),
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
