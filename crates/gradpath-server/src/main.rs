//! GradPath — precompute service for RL course recommendations.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gradpath_server::{build_router, keepalive, AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("GRADPATH_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    info!("Data directory: {}", data_dir.display());

    let config = gradpath_core::GradPathConfig::from_env(&data_dir);
    let port = config.port;

    let store = Arc::new(
        gradpath_store::SqliteStore::open(&config.data_dir)
            .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?,
    );

    let compute = Arc::new(gradpath_compute::HttpComputeClient::new(&config.compute)?);

    let orchestrator = gradpath_precompute::PrecomputeOrchestrator::new(
        store.clone(),
        store.clone(),
        store,
        compute,
        config.precompute.clone(),
    );

    // Background loops stop when the shutdown flag flips.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let worker = gradpath_precompute::ReconciliationWorker::new(
        orchestrator.clone(),
        config.sync_interval,
    );
    worker.spawn(shutdown_rx.clone());

    keepalive::spawn_keepalive(
        config.compute.clone(),
        config.keepalive_interval,
        shutdown_rx,
    );

    let app_state = Arc::new(AppState::new(config, orchestrator));
    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("GradPath server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    Ok(())
}
