use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jackett_bridge_core::{
    load_config, validate_config, ApiGuard, ConfigGenerator, IndexerFetchClient, RefreshScheduler,
};
use jackett_bridge_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("jackett-bridge {}", VERSION);

    // Determine config path
    let config_path = std::env::var("JACKETT_BRIDGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);

    let guard = ApiGuard::from_config(&config.auth).context("Failed to create API guard")?;

    let connection = config.jackett.connection();
    if !config.jackett.enabled {
        warn!("Jackett integration disabled, config generation will be rejected");
    } else if !connection.is_complete() {
        warn!("Jackett host or API key missing, config generation will be rejected");
    } else {
        info!(
            host = %connection.base_url(),
            login = connection.password().is_some(),
            selected = config.jackett.indexers.len(),
            "Jackett integration enabled"
        );
    }

    let fetcher = IndexerFetchClient::from_config(&config.fetch);
    let generator = Arc::new(ConfigGenerator::new(fetcher, config.jackett.clone()));

    // Periodic refresh, if configured
    let scheduler = RefreshScheduler::from_config(Arc::clone(&generator), &config.refresh);
    let refresh_handle = match &scheduler {
        Some(scheduler) => scheduler.start(),
        None => {
            info!("Periodic refresh disabled");
            None
        }
    };

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, guard, generator));

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    if let Some(scheduler) = &scheduler {
        scheduler.stop();
    }
    if let Some(handle) = refresh_handle {
        if let Err(e) = handle.await {
            warn!("Refresh loop ended abnormally: {}", e);
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
