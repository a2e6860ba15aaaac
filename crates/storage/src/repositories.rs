// Repository layer for database operations
//
// Every write runs in a transaction that first takes a transaction-scoped
// advisory lock, so "clear other defaults, then set this one" is atomic with
// respect to concurrent writers. The partial unique index on is_default backs
// this up at the schema level.

use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{ModelConfigRow, ModelConfigWrite};

type Result<T> = std::result::Result<T, StoreError>;

/// Advisory lock key serializing model_configs writes
const MODEL_CONFIGS_LOCK: i64 = 0x6d6f_6463_6667;

const NAME_CONSTRAINT: &str = "model_configs_name_key";

const COLUMNS: &str =
    "id, name, provider, base_url, model_id, api_key, is_default, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn begin_locked(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MODEL_CONFIGS_LOCK)
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    // ============================================
    // Model configurations
    // ============================================

    pub async fn create_model_config(&self, input: ModelConfigWrite) -> Result<ModelConfigRow> {
        let mut tx = self.begin_locked().await?;

        if input.is_default {
            clear_defaults(&mut tx, None).await?;
        }

        let row = sqlx::query_as::<_, ModelConfigRow>(&format!(
            r#"
            INSERT INTO model_configs (id, name, provider, base_url, model_id, api_key, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.provider)
        .bind(&input.base_url)
        .bind(&input.model_id)
        .bind(&input.api_key)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &input.name))?;

        tx.commit().await?;
        Ok(row)
    }

    pub async fn get_model_config(&self, id: Uuid) -> Result<Option<ModelConfigRow>> {
        let row = sqlx::query_as::<_, ModelConfigRow>(&format!(
            "SELECT {COLUMNS} FROM model_configs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All configurations, oldest first
    pub async fn list_model_configs(&self) -> Result<Vec<ModelConfigRow>> {
        let rows = sqlx::query_as::<_, ModelConfigRow>(&format!(
            "SELECT {COLUMNS} FROM model_configs ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Full replace. Returns None when the id does not exist.
    pub async fn update_model_config(
        &self,
        id: Uuid,
        input: ModelConfigWrite,
    ) -> Result<Option<ModelConfigRow>> {
        let mut tx = self.begin_locked().await?;

        let was_default: Option<bool> =
            sqlx::query_scalar::<_, bool>("SELECT is_default FROM model_configs WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(was_default) = was_default else {
            return Ok(None);
        };

        if input.is_default && !was_default {
            clear_defaults(&mut tx, Some(id)).await?;
        }

        let row = sqlx::query_as::<_, ModelConfigRow>(&format!(
            r#"
            UPDATE model_configs
            SET
                name = $2,
                provider = $3,
                base_url = $4,
                model_id = $5,
                api_key = $6,
                is_default = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.provider)
        .bind(&input.base_url)
        .bind(&input.model_id)
        .bind(&input.api_key)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &input.name))?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Replace only the stored credential; timestamps are left alone
    pub async fn update_model_config_credential(&self, id: Uuid, api_key: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE model_configs SET api_key = $2 WHERE id = $1")
            .bind(id)
            .bind(api_key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_model_config(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM model_configs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_default_model_config(&self) -> Result<Option<ModelConfigRow>> {
        let row = sqlx::query_as::<_, ModelConfigRow>(&format!(
            "SELECT {COLUMNS} FROM model_configs WHERE is_default = TRUE LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn count_model_configs(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM model_configs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Messages recorded against a configuration. The messages table is owned
    /// by the chat service; this query only reads it.
    pub async fn count_model_config_references(&self, id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE model_config_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

async fn clear_defaults(tx: &mut Transaction<'static, Postgres>, keep: Option<Uuid>) -> Result<()> {
    sqlx::query(
        "UPDATE model_configs SET is_default = FALSE WHERE is_default = TRUE AND id IS DISTINCT FROM $1",
    )
    .bind(keep)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn map_unique_violation(err: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(NAME_CONSTRAINT) {
            return StoreError::DuplicateName(name.to_string());
        }
    }
    StoreError::Database(err)
}
