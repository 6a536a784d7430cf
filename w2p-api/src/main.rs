//! w2p-api - Wish2Plan HTTP service
//!
//! Serves the idea and plan API on 127.0.0.1 (port 5780 by default).
//!
//! Startup sequence:
//! 1. Parse command line (each flag also reads its environment variable)
//! 2. Load the optional TOML config file
//! 3. Initialize tracing at the configured level
//! 4. Resolve root folder and open (or create) the database
//! 5. Serve until Ctrl+C / SIGTERM

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use w2p_api::services::{HttpMetadataFetcher, MapboxGeocoder};
use w2p_api::{build_router, AppState};
use w2p_common::config::{
    resolve_mapbox_token, resolve_port, RootFolderInitializer, RootFolderResolver, TomlConfig,
};

/// Command-line arguments for w2p-api
#[derive(Parser, Debug)]
#[command(name = "w2p-api")]
#[command(about = "Idea curation and date planning service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "W2P_PORT")]
    port: Option<u16>,

    /// Folder holding wish2plan.db
    #[arg(short, long, env = "W2P_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Mapbox access token for place lookup
    #[arg(long, env = "W2P_MAPBOX_TOKEN", hide_env_values = true)]
    mapbox_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_or_default();

    // RUST_LOG wins over the config file level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting Wish2Plan API (w2p-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(toml_config.clone())
        .with_cli_arg(args.root_folder)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());

    let pool = w2p_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let geocoder = MapboxGeocoder::new(resolve_mapbox_token(args.mapbox_token, &toml_config))
        .context("Failed to create geocoding client")?;
    if !geocoder.is_configured() {
        warn!("Mapbox token not configured; /api/geocode will return 503");
    }

    let metadata = HttpMetadataFetcher::new().context("Failed to create metadata client")?;

    let state = AppState::new(pool, Arc::new(geocoder), Arc::new(metadata));
    let app = build_router(state);

    let port = resolve_port(args.port, &toml_config);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("w2p-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
