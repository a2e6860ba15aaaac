// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// A unified StorageBackend enum that works with either PostgreSQL
// (production) or in-memory (dev mode) storage.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::memory::InMemoryDatabase;
use crate::models::{ModelConfigRow, ModelConfigWrite};
use crate::repositories::Database;

type Result<T> = std::result::Result<T, StoreError>;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using PostgreSQL backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Model configurations
    // ============================================

    pub async fn create_model_config(&self, input: ModelConfigWrite) -> Result<ModelConfigRow> {
        match self {
            Self::Postgres(db) => db.create_model_config(input).await,
            Self::InMemory(db) => db.create_model_config(input).await,
        }
    }

    pub async fn get_model_config(&self, id: Uuid) -> Result<Option<ModelConfigRow>> {
        match self {
            Self::Postgres(db) => db.get_model_config(id).await,
            Self::InMemory(db) => db.get_model_config(id).await,
        }
    }

    pub async fn list_model_configs(&self) -> Result<Vec<ModelConfigRow>> {
        match self {
            Self::Postgres(db) => db.list_model_configs().await,
            Self::InMemory(db) => db.list_model_configs().await,
        }
    }

    pub async fn update_model_config(
        &self,
        id: Uuid,
        input: ModelConfigWrite,
    ) -> Result<Option<ModelConfigRow>> {
        match self {
            Self::Postgres(db) => db.update_model_config(id, input).await,
            Self::InMemory(db) => db.update_model_config(id, input).await,
        }
    }

    pub async fn update_model_config_credential(&self, id: Uuid, api_key: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.update_model_config_credential(id, api_key).await,
            Self::InMemory(db) => db.update_model_config_credential(id, api_key).await,
        }
    }

    pub async fn delete_model_config(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_model_config(id).await,
            Self::InMemory(db) => db.delete_model_config(id).await,
        }
    }

    pub async fn get_default_model_config(&self) -> Result<Option<ModelConfigRow>> {
        match self {
            Self::Postgres(db) => db.get_default_model_config().await,
            Self::InMemory(db) => db.get_default_model_config().await,
        }
    }

    pub async fn count_model_configs(&self) -> Result<i64> {
        match self {
            Self::Postgres(db) => db.count_model_configs().await,
            Self::InMemory(db) => db.count_model_configs().await,
        }
    }
}
