//! Sync Cache server
//!
//! Serves a `SyncCache` over HTTP and writes a final snapshot on shutdown.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sync_cache::api::create_router;
use sync_cache::{AppState, Config};

/// Main entry point for the Sync Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and start its background tasks
/// 4. Merge an existing snapshot, if configured
/// 5. Serve the HTTP API until SIGINT/SIGTERM
/// 6. Flush a final snapshot and stop the background tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sync_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sync Cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cleanup_interval={:?}, save_interval={:?}, persist_file={:?}, port={}",
        config.cleanup_interval, config.save_interval, config.persist_file, config.server_port
    );

    let state = AppState::from_config(&config);

    if config.load_on_start {
        if let Some(path) = config.persist_file.as_ref().filter(|p| p.exists()) {
            let report = state
                .cache
                .load(path)
                .with_context(|| format!("failed to load snapshot {}", path.display()))?;
            info!(
                "Restored {} entries ({} expired, {} already live)",
                report.restored, report.skipped_expired, report.kept_live
            );
        }
    }

    let cache = state.cache.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Final snapshot before exit
    let flushed = if cache.persistence_enabled() {
        cache.flush().await
    } else {
        Ok(())
    };
    cache.shutdown().await;

    match flushed {
        Ok(()) => {
            info!("Server shutdown complete");
            Ok(())
        }
        Err(err) => {
            error!("Final snapshot failed: {}", err);
            Err(err).context("final snapshot failed")
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
