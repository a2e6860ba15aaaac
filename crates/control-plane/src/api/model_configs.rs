// Model configuration HTTP routes
//
// Thin binding over ModelConfigService and ConnectionProber. Every body that
// leaves here is a masked ModelConfig, a ProbeResponse or an ErrorResponse.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use modelgate_core::{ModelConfig, ModelConfigInput, ProbeProfile, ProbeResponse};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::common::{error_response, ErrorResponse, ListResponse};
use crate::context::AppContext;
use crate::services::{ConnectionProber, ModelConfigService};

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ModelConfigService>,
    pub prober: Arc<ConnectionProber>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            service: ctx.model_configs.clone(),
            prober: ctx.prober.clone(),
            shutdown: ctx.shutdown.clone(),
        }
    }

    fn probe_timeout(&self) -> Duration {
        self.prober.default_timeout()
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/model-configs",
            post(create_model_config).get(list_model_configs),
        )
        .route("/v1/model-configs/test", post(test_connection))
        .route(
            "/v1/model-configs/:id",
            get(get_model_config)
                .put(update_model_config)
                .delete(delete_model_config),
        )
        .route("/v1/model-configs/:id/test", post(test_saved_connection))
        .with_state(state)
}

/// POST /v1/model-configs - Create a model configuration
#[utoipa::path(
    post,
    path = "/v1/model-configs",
    request_body = ModelConfigInput,
    responses(
        (status = 201, description = "Configuration created", body = ModelConfig),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn create_model_config(
    State(state): State<AppState>,
    Json(req): Json<ModelConfigInput>,
) -> Result<(StatusCode, Json<ModelConfig>), ApiError> {
    let config = state.service.create(req).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(config)))
}

/// GET /v1/model-configs - List model configurations, oldest first
#[utoipa::path(
    get,
    path = "/v1/model-configs",
    responses(
        (status = 200, description = "List of configurations", body = ListResponse<ModelConfig>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn list_model_configs(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<ModelConfig>>, ApiError> {
    let configs = state.service.list().await.map_err(error_response)?;
    Ok(Json(ListResponse::new(configs)))
}

/// GET /v1/model-configs/{id} - Get a model configuration
#[utoipa::path(
    get,
    path = "/v1/model-configs/{id}",
    params(
        ("id" = Uuid, Path, description = "Configuration ID")
    ),
    responses(
        (status = 200, description = "Configuration found", body = ModelConfig),
        (status = 404, description = "Configuration not found", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn get_model_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ModelConfig>, ApiError> {
    let config = state.service.get(id).await.map_err(error_response)?;
    Ok(Json(config))
}

/// PUT /v1/model-configs/{id} - Replace a model configuration
#[utoipa::path(
    put,
    path = "/v1/model-configs/{id}",
    params(
        ("id" = Uuid, Path, description = "Configuration ID")
    ),
    request_body = ModelConfigInput,
    responses(
        (status = 200, description = "Configuration updated", body = ModelConfig),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Configuration not found", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn update_model_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ModelConfigInput>,
) -> Result<Json<ModelConfig>, ApiError> {
    let config = state.service.update(id, req).await.map_err(error_response)?;
    Ok(Json(config))
}

/// DELETE /v1/model-configs/{id} - Delete an unused model configuration
#[utoipa::path(
    delete,
    path = "/v1/model-configs/{id}",
    params(
        ("id" = Uuid, Path, description = "Configuration ID")
    ),
    responses(
        (status = 204, description = "Configuration deleted"),
        (status = 404, description = "Configuration not found", body = ErrorResponse),
        (status = 409, description = "Configuration is referenced by messages", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn delete_model_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/model-configs/test - Test a connection profile without saving it
///
/// Probe failures are reported in the body with status 200. A profile
/// without a model is rejected with 400.
#[utoipa::path(
    post,
    path = "/v1/model-configs/test",
    request_body = ProbeProfile,
    responses(
        (status = 200, description = "Probe result", body = ProbeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn test_connection(
    State(state): State<AppState>,
    Json(profile): Json<ProbeProfile>,
) -> Result<Json<ProbeResponse>, ApiError> {
    profile.validate().map_err(error_response)?;

    let cancel = state.shutdown.child_token();
    let result = state
        .prober
        .probe(&profile, state.probe_timeout(), &cancel)
        .await;
    Ok(Json(result.to_response()))
}

/// POST /v1/model-configs/{id}/test - Test a saved configuration
#[utoipa::path(
    post,
    path = "/v1/model-configs/{id}/test",
    params(
        ("id" = Uuid, Path, description = "Configuration ID")
    ),
    responses(
        (status = 200, description = "Probe result", body = ProbeResponse),
        (status = 404, description = "Configuration not found", body = ErrorResponse)
    ),
    tag = "model-configs"
)]
pub async fn test_saved_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProbeResponse>, ApiError> {
    let cancel = state.shutdown.child_token();
    let result = state
        .prober
        .probe_saved(&state.service, id, state.probe_timeout(), &cancel)
        .await
        .map_err(error_response)?;
    Ok(Json(result.to_response()))
}
