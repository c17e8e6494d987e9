// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use std::net::SocketAddr;
use std::sync::Arc;

use keenetic_monitor::{
    AppState, Config, MetricsRegistry, Result, WorkerRegistry, build_measures, create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    setup_tracing();

    let config = Config::from_env();

    tracing::info!(
        "Loaded configuration for {} router(s)",
        config.routers.len()
    );
    for router in &config.routers {
        tracing::info!(
            "  - Router '{}' at {} ({} interface(s))",
            router.name,
            router.url,
            router.interfaces.len()
        );
    }

    let workers = WorkerRegistry::new();
    let measures = build_measures(&workers, &config);

    let state = Arc::new(AppState {
        config: config.clone(),
        metrics: MetricsRegistry::new(),
        workers,
        measures,
    });

    let app = create_router(state.clone());

    let addr: SocketAddr = config.server_addr.parse().map_err(|e| {
        tracing::error!("Invalid server address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind address: {}", e);
        e
    })?;

    tracing::info!("Keenetic Monitor starting on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - GET /health  - Health check");
    tracing::info!("  - GET /metrics - Interface rates");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
            }
        })
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    // Dropping the measures stops and joins every worker
    tokio::task::spawn_blocking(move || drop(state)).await.ok();
    tracing::info!("All workers stopped");

    Ok(())
}

fn setup_tracing() {
    // RUST_LOG wins, "info" otherwise
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
