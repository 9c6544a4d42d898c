//! Profile Cache - staleness-aware cache of scraped player profiles
//!
//! HTTP server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use profile_cache::cache::{FreshnessPolicy, MemoryStore, MemoryVolatileStore, ProfileStore};
use profile_cache::profile::{HttpDataSource, ProfileService};
use profile_cache::tasks::{
    spawn_cleanup_task, spawn_refresh_worker, spawn_reload_task, RefreshQueue,
};
use profile_cache::{create_router, AppState, Config};

/// Main entry point for the profile cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the durable store and create the volatile tier
/// 4. Wire the upstream client, refresh queue and orchestrator
/// 5. Start the refresh worker, cleanup and reload tasks
/// 6. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Profile Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, data_file={}, stale_after={}s, workers={}, port={}",
        config.upstream_url,
        config.data_file.display(),
        config.stale_after,
        config.stats_workers,
        config.server_port
    );
    let policy = config.refresh_policy();

    let durable = Arc::new(
        MemoryStore::open(&config.data_file)
            .await
            .with_context(|| format!("opening {}", config.data_file.display()))?,
    );
    let volatile = MemoryVolatileStore::new(
        config.volatile_max_entries,
        Some(Duration::from_secs(config.volatile_ttl)),
    );
    let store = ProfileStore::new(durable.clone(), Some(Arc::new(volatile.clone())));
    info!("Profile store initialized");

    let source = HttpDataSource::new(
        &config.upstream_url,
        Duration::from_secs(config.upstream_timeout),
    )
    .context("building upstream client")?;

    let (queue, jobs) = RefreshQueue::new();
    let queue = Arc::new(queue);
    let service = Arc::new(ProfileService::new(
        store,
        Arc::new(source),
        queue.clone(),
        &policy,
    ));

    let handles = vec![
        spawn_refresh_worker(service.clone(), jobs),
        spawn_cleanup_task(volatile.cache(), config.cleanup_interval),
        spawn_reload_task(
            durable,
            queue.clone(),
            FreshnessPolicy::new(policy.stale_after),
            config.reload_interval,
        ),
    ];
    info!("Background tasks started");

    let state = AppState::new(service, queue, Some(volatile), config.stale_list_limit);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(handles))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then aborts the background tasks.
async fn shutdown_signal(handles: Vec<JoinHandle<()>>) {
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

    for handle in handles {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
