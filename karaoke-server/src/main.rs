use anyhow::Context;
use karaoke_engine::{EngineConfig, JobManager};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "karaoke_server=debug,karaoke_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Karaoke Server...");

    let engine_config = EngineConfig::from_env();
    engine_config
        .validate()
        .context("Invalid engine configuration")?;
    let server_config = ServerConfig::from_env();

    tracing::info!("Data directory: {}", engine_config.data_dir.display());
    tracing::debug!("Tools: {:?}", engine_config.tools);

    let manager = Arc::new(
        JobManager::from_config(&engine_config).context("Failed to initialize job manager")?,
    );

    let app = api::create_router(manager, server_config.static_dir.as_deref());
    if let Some(dir) = &server_config.static_dir {
        tracing::info!("Serving static files from {}", dir.display());
    }

    tracing::info!("Listening on {}", server_config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
