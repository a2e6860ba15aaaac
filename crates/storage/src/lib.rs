// Storage layer for model configurations
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - encryption: credential envelopes under the master key
// - repositories: PostgreSQL via sqlx, with embedded migrations
// - memory: in-memory database for dev mode and tests
// - backend: enum dispatch over the two
// - usage: reference counting consulted before delete

pub mod backend;
pub mod encryption;
pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod usage;

pub use backend::StorageBackend;
pub use encryption::{
    EncryptionService, Envelope, MasterKey, StoredCredential, ENVELOPE_VERSION, MASTER_KEY_ENV,
};
pub use error::StoreError;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
pub use usage::UsageCounter;
