// Usage lookup consulted before a configuration is deleted
//
// The chat service owns the records that point at a configuration; this
// trait is the seam through which the store asks how many there are.

use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::StoreError;
use crate::memory::InMemoryDatabase;
use crate::repositories::Database;

#[async_trait]
pub trait UsageCounter: Send + Sync {
    /// Number of usage records referencing the configuration
    async fn count_references(&self, model_config_id: Uuid) -> Result<i64, StoreError>;
}

#[async_trait]
impl UsageCounter for Database {
    async fn count_references(&self, model_config_id: Uuid) -> Result<i64, StoreError> {
        self.count_model_config_references(model_config_id).await
    }
}

#[async_trait]
impl UsageCounter for InMemoryDatabase {
    async fn count_references(&self, model_config_id: Uuid) -> Result<i64, StoreError> {
        self.count_model_config_references(model_config_id).await
    }
}

#[async_trait]
impl UsageCounter for StorageBackend {
    async fn count_references(&self, model_config_id: Uuid) -> Result<i64, StoreError> {
        match self {
            Self::Postgres(db) => db.count_references(model_config_id).await,
            Self::InMemory(db) => db.count_references(model_config_id).await,
        }
    }
}
