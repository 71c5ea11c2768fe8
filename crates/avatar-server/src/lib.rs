//! avatar-server: HTTP API for user records and avatar uploads.
//!
//! This crate ties the database and the avatar store together behind an
//! Axum router. It provides:
//!
//! - JSON endpoints to create and fetch users
//! - Multipart avatar upload with the coordinated replace protocol
//! - Avatar deletion
//! - Static serving of stored avatars under `/static`
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;

use avatar_core::config::Config;
use avatar_core::Error;
use avatar_store::{AvatarStore, StoreConfig};
use tokio::net::TcpListener;

use crate::context::AppContext;

/// Start the avatar server.
///
/// Opens (or creates) the database, prepares the storage root, and serves
/// HTTP until a shutdown signal is received.
pub async fn start(config: Config) -> avatar_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db_path = &config.database.path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = avatar_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    let store = AvatarStore::new(StoreConfig::from_config(&config))?;
    tracing::info!(
        "Avatar storage at {} (max {} bytes)",
        store.root().display(),
        store.max_size()
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::Internal(format!("Invalid server address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    let ctx = AppContext::new(db, store);
    serve(listener, ctx, shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Serve the API on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, ctx: AppContext, shutdown: F) -> avatar_core::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on {addr}");
    }

    let app = router::build_router(ctx);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
