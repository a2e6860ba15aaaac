// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL repository API so the control-plane can run without
// a database. Each write holds the table's write lock for its whole duration,
// which gives the same atomic default switch the advisory lock gives Postgres.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{ModelConfigRow, ModelConfigWrite};

type Result<T> = std::result::Result<T, StoreError>;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    model_configs: RwLock<HashMap<Uuid, ModelConfigRow>>,
    // Message references per configuration, standing in for the messages table
    references: RwLock<HashMap<Uuid, i64>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Model configurations
    // ============================================

    pub async fn create_model_config(&self, input: ModelConfigWrite) -> Result<ModelConfigRow> {
        let mut configs = self.model_configs.write();

        if configs.values().any(|c| c.name == input.name) {
            return Err(StoreError::DuplicateName(input.name));
        }

        if input.is_default {
            for config in configs.values_mut() {
                config.is_default = false;
            }
        }

        let now = Self::now();
        let id = Uuid::now_v7();
        let row = ModelConfigRow {
            id,
            name: input.name,
            provider: input.provider,
            base_url: input.base_url,
            model_id: input.model_id,
            api_key: input.api_key,
            is_default: input.is_default,
            created_at: now,
            updated_at: now,
        };
        configs.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_model_config(&self, id: Uuid) -> Result<Option<ModelConfigRow>> {
        Ok(self.model_configs.read().get(&id).cloned())
    }

    pub async fn list_model_configs(&self) -> Result<Vec<ModelConfigRow>> {
        let mut rows: Vec<_> = self.model_configs.read().values().cloned().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    pub async fn update_model_config(
        &self,
        id: Uuid,
        input: ModelConfigWrite,
    ) -> Result<Option<ModelConfigRow>> {
        let mut configs = self.model_configs.write();

        let Some(was_default) = configs.get(&id).map(|c| c.is_default) else {
            return Ok(None);
        };

        if configs
            .values()
            .any(|c| c.id != id && c.name == input.name)
        {
            return Err(StoreError::DuplicateName(input.name));
        }

        if input.is_default && !was_default {
            for config in configs.values_mut() {
                config.is_default = false;
            }
        }

        let Some(row) = configs.get_mut(&id) else {
            return Ok(None);
        };
        row.name = input.name;
        row.provider = input.provider;
        row.base_url = input.base_url;
        row.model_id = input.model_id;
        row.api_key = input.api_key;
        row.is_default = input.is_default;
        row.updated_at = Self::now().max(row.created_at);
        Ok(Some(row.clone()))
    }

    pub async fn update_model_config_credential(&self, id: Uuid, api_key: &str) -> Result<bool> {
        match self.model_configs.write().get_mut(&id) {
            Some(row) => {
                row.api_key = api_key.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn delete_model_config(&self, id: Uuid) -> Result<bool> {
        let removed = self.model_configs.write().remove(&id).is_some();
        if removed {
            self.references.write().remove(&id);
        }
        Ok(removed)
    }

    pub async fn get_default_model_config(&self) -> Result<Option<ModelConfigRow>> {
        Ok(self
            .model_configs
            .read()
            .values()
            .find(|c| c.is_default)
            .cloned())
    }

    pub async fn count_model_configs(&self) -> Result<i64> {
        Ok(self.model_configs.read().len() as i64)
    }

    // ============================================
    // Message references
    // ============================================

    /// Record that a message was produced with this configuration
    pub fn record_reference(&self, id: Uuid) {
        *self.references.write().entry(id).or_insert(0) += 1;
    }

    pub async fn count_model_config_references(&self, id: Uuid) -> Result<i64> {
        Ok(self.references.read().get(&id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(name: &str, is_default: bool) -> ModelConfigWrite {
        ModelConfigWrite {
            name: name.to_string(),
            provider: "openai".to_string(),
            base_url: String::new(),
            model_id: "gpt-4o-mini".to_string(),
            api_key: "v1:sealed".to_string(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = InMemoryDatabase::new();
        let row = db.create_model_config(write("A", false)).await.unwrap();

        let fetched = db.get_model_config(row.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "A");
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert!(db.get_model_config(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_leaves_count_unchanged() {
        let db = InMemoryDatabase::new();
        db.create_model_config(write("A", false)).await.unwrap();

        let err = db.create_model_config(write("A", true)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(n) if n == "A"));
        assert_eq!(db.count_model_configs().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_new_default_clears_previous() {
        let db = InMemoryDatabase::new();
        let a = db.create_model_config(write("A", true)).await.unwrap();
        let b = db.create_model_config(write("B", true)).await.unwrap();

        assert!(!db.get_model_config(a.id).await.unwrap().unwrap().is_default);
        assert_eq!(db.get_default_model_config().await.unwrap().unwrap().id, b.id);
    }

    #[tokio::test]
    async fn test_update_keeps_other_default_unless_promoted() {
        let db = InMemoryDatabase::new();
        let a = db.create_model_config(write("A", true)).await.unwrap();
        let b = db.create_model_config(write("B", false)).await.unwrap();

        // Editing B without promoting it leaves A as default
        db.update_model_config(b.id, write("B2", false)).await.unwrap();
        assert_eq!(db.get_default_model_config().await.unwrap().unwrap().id, a.id);

        // Re-saving the current default keeps it default
        db.update_model_config(a.id, write("A", true)).await.unwrap();
        assert_eq!(db.get_default_model_config().await.unwrap().unwrap().id, a.id);

        db.update_model_config(b.id, write("B2", true)).await.unwrap();
        assert_eq!(db.get_default_model_config().await.unwrap().unwrap().id, b.id);
        assert!(!db.get_model_config(a.id).await.unwrap().unwrap().is_default);
    }

    #[tokio::test]
    async fn test_update_rename_collision_and_missing() {
        let db = InMemoryDatabase::new();
        db.create_model_config(write("A", false)).await.unwrap();
        let b = db.create_model_config(write("B", false)).await.unwrap();

        let err = db.update_model_config(b.id, write("A", false)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
        assert_eq!(db.get_model_config(b.id).await.unwrap().unwrap().name, "B");

        // Keeping its own name is not a collision
        assert!(db.update_model_config(b.id, write("B", false)).await.unwrap().is_some());
        assert!(db
            .update_model_config(Uuid::now_v7(), write("C", false))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_creation() {
        let db = InMemoryDatabase::new();
        for name in ["first", "second", "third"] {
            db.create_model_config(write(name, false)).await.unwrap();
        }

        let names: Vec<_> = db
            .list_model_configs()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_references_and_delete() {
        let db = InMemoryDatabase::new();
        let row = db.create_model_config(write("A", false)).await.unwrap();

        db.record_reference(row.id);
        db.record_reference(row.id);
        assert_eq!(db.count_model_config_references(row.id).await.unwrap(), 2);

        assert!(db.delete_model_config(row.id).await.unwrap());
        assert!(!db.delete_model_config(row.id).await.unwrap());
        assert_eq!(db.count_model_config_references(row.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_credential_keeps_timestamps() {
        let db = InMemoryDatabase::new();
        let row = db.create_model_config(write("A", false)).await.unwrap();

        assert!(db
            .update_model_config_credential(row.id, "v1:resealed")
            .await
            .unwrap());
        let fetched = db.get_model_config(row.id).await.unwrap().unwrap();
        assert_eq!(fetched.api_key, "v1:resealed");
        assert_eq!(fetched.updated_at, row.updated_at);
    }
}
