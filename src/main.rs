//! Todo Cache - A todo service fronted by a cache-aside coordinator
//!
//! Serves reads from a distributed text store, computing missing values at
//! most once at a time behind a single-flight gate.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_cache::api::{create_router, AppState};
use todo_cache::cache::{CancellationSource, DistributedStore, MemoryStore, RedisStore};
use todo_cache::{spawn_cleanup_task, Config};

/// Main entry point for the todo cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to Redis, or fall back to the in-memory store
/// 4. Start background cleanup task (in-memory store only)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Todo Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: absolute_ttl={}s, sliding_ttl={}s, gate_wait={}ms, lock_mode={:?}, port={}",
        config.absolute_ttl,
        config.sliding_ttl,
        config.gate_wait_ms,
        config.lock_mode,
        config.server_port
    );

    let (store, cleanup_handle): (Arc<dyn DistributedStore>, Option<JoinHandle<()>>) =
        match config.redis_config() {
            Some(redis_config) => {
                let url = redis_config.url.clone();
                let store = RedisStore::connect(redis_config)
                    .await
                    .with_context(|| format!("failed to connect to Redis at {}", url))?;
                info!("Redis store connected at {}", url);
                (Arc::new(store) as Arc<dyn DistributedStore>, None)
            }
            None => {
                let store = Arc::new(MemoryStore::new());
                let handle = spawn_cleanup_task(store.clone(), config.cleanup_interval);
                info!("In-memory store initialized with background cleanup");
                (store as Arc<dyn DistributedStore>, Some(handle))
            }
        };

    let shutdown = CancellationSource::new();
    let state = AppState::new(store, config.cache_settings()).with_shutdown(shutdown.token());
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown, cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, cancels in-flight cache work and aborts the cleanup task.
async fn shutdown_signal(shutdown: CancellationSource, cleanup_handle: Option<JoinHandle<()>>) {
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
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    shutdown.cancel();

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
