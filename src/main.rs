//! Peercache node
//!
//! Serves one group over HTTP, loading misses from files in `DATA_DIR` and
//! routing keys to the other nodes listed in `PEERS`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::origin::DirLoader;
use peercache::{create_router, spawn_purge_task, AppState, Config, GroupRegistry, HttpPool};

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the peer pool and the served group
/// 4. Start the optional expiration purge task
/// 5. Serve the transport router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        self_addr = %config.self_addr,
        peers = ?config.peers,
        group = %config.group_name,
        cache_bytes = config.cache_bytes,
        replicas = config.replicas,
        "configuration loaded"
    );

    let pool = Arc::new(HttpPool::from_config(&config).context("failed to build peer pool")?);

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.new_group(
        config.group_name.clone(),
        config.cache_bytes,
        DirLoader::new(config.data_dir.clone()),
    );
    group.register_peers(pool.clone())?;
    info!(group = %group.name(), data_dir = %config.data_dir.display(), "group ready");

    let purge_handle = config
        .purge_interval
        .map(|interval| spawn_purge_task(registry.clone(), interval));

    let app = create_router(AppState::new(registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(purge_handle))
        .await
        .context("server error")?;

    info!("Node shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the purge task.
async fn shutdown_signal(purge_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    if let Some(handle) = purge_handle {
        handle.abort();
        info!("Purge task stopped");
    }
}
