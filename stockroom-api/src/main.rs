//! stockroom-api - Material inventory REST API
//!
//! Serves list/create/update/delete over the materials table, stores
//! uploaded photos on disk and serves them back under `/uploads/`.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use stockroom_api::config::{Args, ServerSettings};
use stockroom_api::{build_router, AppState, PhotoStore};
use stockroom_common::auth::{ApiKeyVerifier, StaticApiKey};
use stockroom_common::config::{config_file_path, TomlConfig};
use stockroom_common::db::init_database;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const MODULE_NAME: &str = "stockroom-api";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_for_module(MODULE_NAME);
    let settings = ServerSettings::resolve(&args, &toml_config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting stockroom-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match config_file_path(MODULE_NAME) {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using command line/environment/defaults"),
    }

    let paths = settings.paths();
    paths
        .ensure_directory_exists()
        .with_context(|| format!("Failed to create root folder {}", paths.root().display()))?;
    info!("Root folder: {}", paths.root().display());

    let db_path = paths.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready: {}", db_path.display());
            pool
        }
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    let photos = PhotoStore::new(paths.uploads_path());
    photos
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create uploads folder {}", photos.dir().display()))?;
    info!("Uploads folder: {}", photos.dir().display());

    let api_keys = StaticApiKey::new(&settings.api_key);
    if api_keys.is_enabled() {
        info!("✓ API key authentication enabled");
    } else {
        warn!("API key authentication DISABLED (no api_key configured)");
        warn!("Set STOCKROOM_API_KEY or api_key in the TOML config to protect /materiais");
    }

    let state = AppState::new(pool.clone(), photos, Arc::new(api_keys))
        .with_max_upload_bytes(settings.max_upload_bytes);
    let app = build_router(state);

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("stockroom-api listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
