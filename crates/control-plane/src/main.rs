// Modelgate API server
// Decision: Master key is validated before anything else; a bad key aborts startup
// Decision: Bootstrap failures are logged, never fatal

use std::sync::Arc;

use anyhow::{Context, Result};
use modelgate_control_plane::services::{bootstrap, BootstrapOutcome};
use modelgate_control_plane::{build_router, AppConfig, AppContext};
use modelgate_openai::OpenAiClient;
use modelgate_storage::{EncryptionService, MasterKey, StorageBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "modelgate_control_plane=debug,modelgate_storage=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded .env from {:?}", path);
    }

    tracing::info!("modelgate-control-plane starting...");

    let master_key = MasterKey::from_env().context("Failed to load master key")?;
    let encryption = EncryptionService::new(&master_key);
    drop(master_key);
    tracing::info!("Encryption service initialized for credential storage");

    let config = AppConfig::from_env();

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database, migrations applied");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };

    let ctx = AppContext::new(
        db,
        encryption,
        Arc::new(OpenAiClient::new()),
        config.probe_timeout,
    );

    match bootstrap(&ctx.model_configs, config.legacy_credential.as_ref()).await {
        Ok(BootstrapOutcome::Created(created)) => {
            tracing::info!(id = %created.id, name = %created.name, "Bootstrapped default model configuration");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Bootstrap from legacy credential failed, continuing");
        }
    }

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let app = build_router(&ctx, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    let shutdown = ctx.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received, cancelling in-flight connection tests");
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    Ok(())
}
