// Storage error types

use modelgate_core::ConfigError;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Name uniqueness violated
    #[error("A configuration named '{0}' already exists")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StoreError> for ConfigError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateName(name) => ConfigError::DuplicateName(name),
            other => ConfigError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_keeps_its_class() {
        let err: ConfigError = StoreError::DuplicateName("Primary".into()).into();
        assert!(matches!(err, ConfigError::DuplicateName(n) if n == "Primary"));
    }

    #[test]
    fn test_database_errors_become_storage() {
        let err: ConfigError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, ConfigError::Storage(_)));
    }
}
