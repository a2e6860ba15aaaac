// HTTP API routes
//
// Each submodule handles a specific resource type with its own AppState.

pub mod common;
pub mod model_configs;

// Re-export common types
pub use common::{error_response, ErrorResponse, ListResponse};
