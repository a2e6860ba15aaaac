// Model Configuration Core
//
// This crate provides the DB-agnostic types shared by storage, the API and
// the connectivity prober.
//
// Key design decisions:
// - ModelConfig is the masked view: it has no credential field at all
// - Errors are a single typed taxonomy (ConfigError) mapped to HTTP at the edge
// - The outbound completion call is abstracted by CompletionClient
// - Probe classification is a pure function over the collaborator's error text

pub mod error;
pub mod llm;
pub mod model_config;
pub mod probe;

// Re-exports for convenience
pub use error::{ConfigError, Result};
pub use llm::{CompletionClient, CompletionError, CompletionRequest};
pub use model_config::{ModelConfig, ModelConfigInput, ProviderType, ResolvedModelConfig};
pub use probe::{classify_failure, ProbeProfile, ProbeResponse, ProbeResult};
