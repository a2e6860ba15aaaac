// OpenAPI specification generation
//
// Used by the API server (for Swagger UI) and by the export-openapi binary
// (for static spec generation).

use crate::api;
use crate::api::{ErrorResponse, ListResponse};
use modelgate_core::{ModelConfig, ModelConfigInput, ProbeProfile, ProbeResponse, ProviderType};
use utoipa::OpenApi;

/// OpenAPI documentation for the Modelgate API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::model_configs::create_model_config,
        api::model_configs::list_model_configs,
        api::model_configs::get_model_config,
        api::model_configs::update_model_config,
        api::model_configs::delete_model_config,
        api::model_configs::test_connection,
        api::model_configs::test_saved_connection,
    ),
    components(
        schemas(
            ModelConfig, ModelConfigInput, ProviderType,
            ListResponse<ModelConfig>,
            ProbeProfile, ProbeResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "model-configs", description = "LLM connection profile management and connection tests")
    ),
    info(
        title = "Modelgate API",
        version = "0.1.0",
        description = "API for managing named LLM provider connection profiles with encrypted credentials",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_model_config_paths() {
        let json = ApiDoc::to_json().unwrap();
        assert!(json.contains("/v1/model-configs/{id}/test"));
        assert!(json.contains("ProbeResponse"));
    }
}
