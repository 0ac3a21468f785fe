//! Peercache node
//!
//! Serves one cache group to its peers, backed by a demo slow database.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::api::{create_api_router, create_peer_router, AppState};
use peercache::error::BoxError;
use peercache::{spawn_stats_reporter, Config, Getter, GetterFn, GroupRegistry, HttpPool};

const SLOW_DB_DELAY: Duration = Duration::from_millis(200);

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the group, backed by the demo database
/// 4. Build the peer pool and register it with the group
/// 5. Start the background stats reporter
/// 6. Serve the peer endpoint (and the client API when configured)
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
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

    info!("Starting peercache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, group={}, cache_bytes={}, port={}",
        config.self_url, config.peers, config.group_name, config.cache_bytes, config.server_port
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.create_group(&config.group_name, config.cache_bytes, slow_db());

    let pool = Arc::new(
        HttpPool::new(&config.self_url, config.pool_options())
            .context("failed to build peer client")?,
    );
    pool.set(&config.peers);
    group.register_peers(pool)?;

    let reporter = (config.stats_interval > 0)
        .then(|| spawn_stats_reporter(Arc::clone(&registry), config.stats_interval));

    let state = AppState::new(Arc::clone(&registry), &config.group_name, &config.self_url);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let api_server = match config.api_port {
        Some(port) => {
            let listener = bind(port).await?;
            let app = create_api_router(state.clone());
            let mut rx = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = rx.wait_for(|stop| *stop).await;
                    })
                    .await
            }))
        }
        None => None,
    };

    let listener = bind(config.server_port).await?;
    let app = create_peer_router(state, &config.base_path);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx, reporter))
        .await
        .context("peer server failed")?;

    if let Some(handle) = api_server {
        handle.await?.context("api server failed")?;
    }

    info!("Node shutdown complete");
    Ok(())
}

async fn bind(port: u16) -> anyhow::Result<tokio::net::TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);
    Ok(listener)
}

/// Demo source of truth: an in-memory table with a slow lookup.
fn slow_db() -> impl Getter {
    let db: Arc<HashMap<&'static str, &'static str>> =
        Arc::new(HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]));

    GetterFn(move |key: String| {
        let db = Arc::clone(&db);
        async move {
            info!(key = %key, "[SlowDB] search key");
            tokio::time::sleep(SLOW_DB_DELAY).await;
            match db.get(key.as_str()) {
                Some(v) => Ok(v.as_bytes().to_vec()),
                None => Err::<Vec<u8>, BoxError>(format!("{key} not exist").into()),
            }
        }
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown, stops the API server and aborts the stats reporter.
async fn shutdown_signal(
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    reporter: Option<JoinHandle<()>>,
) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
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

    let _ = shutdown_tx.send(true);
    if let Some(handle) = reporter {
        handle.abort();
        warn!("Stats reporter aborted");
    }
}
