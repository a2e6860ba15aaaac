// Error types for model configuration management

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for model configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while managing model configurations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Another configuration already uses this name
    #[error("A configuration named '{0}' already exists")]
    DuplicateName(String),

    /// No configuration with this id
    #[error("Configuration not found: {0}")]
    NotFound(Uuid),

    /// Configuration is referenced by usage records and cannot be deleted
    #[error("Configuration {id} is referenced by {references} message(s)")]
    InUse { id: Uuid, references: i64 },

    /// The usage lookup before delete failed
    #[error("Failed to check configuration usage: {0}")]
    CheckFailed(String),

    /// Stored credential is not a well-formed envelope
    #[error("Malformed credential envelope: {0}")]
    MalformedEnvelope(&'static str),

    /// Envelope was well-formed but did not authenticate under the master key
    #[error("Credential decryption failed")]
    DecryptionFailed,

    /// Master key missing or invalid
    #[error("Master key unavailable: {0}")]
    KeyUnavailable(String),

    /// Request failed validation
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Persistence engine error
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Connection timeout")]
    ProbeTimeout,

    #[error("Authentication failed")]
    ProbeAuthFailed,

    #[error("Invalid model ID")]
    ProbeModelNotFound,

    #[error("Rate limit exceeded")]
    ProbeRateLimited,

    #[error("Connection failed: {0}")]
    ProbeOther(String),
}

impl ConfigError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ConfigError::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        ConfigError::Storage(msg.into())
    }

    /// Whether the error text is safe to return to an API client verbatim.
    ///
    /// Storage, usage-check and envelope failures carry internal detail and
    /// are reported to clients with a generic message instead.
    pub fn is_client_safe(&self) -> bool {
        matches!(
            self,
            ConfigError::DuplicateName(_)
                | ConfigError::NotFound(_)
                | ConfigError::InUse { .. }
                | ConfigError::Validation(_)
        )
    }
}
