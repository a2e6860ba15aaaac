// Database models (internal, may differ from public DTOs)
//
// ModelConfigRow carries the sealed credential and is deliberately not
// serializable. The API only ever sees the masked ModelConfig projection.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, FromRow)]
pub struct ModelConfigRow {
    pub id: Uuid,
    pub name: String,
    pub provider: String,
    pub base_url: String,
    pub model_id: String,
    /// Sealed credential envelope, or empty
    pub api_key: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ModelConfigRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfigRow")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .field("is_default", &self.is_default)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Insert or full-replace payload. `api_key` is already sealed.
#[derive(Clone)]
pub struct ModelConfigWrite {
    pub name: String,
    pub provider: String,
    pub base_url: String,
    pub model_id: String,
    pub api_key: String,
    pub is_default: bool,
}

impl std::fmt::Debug for ModelConfigWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfigWrite")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .field("is_default", &self.is_default)
            .finish()
    }
}
