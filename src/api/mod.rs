// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! HTTP API module for Keenetic Monitor
//!
//! Provides REST API endpoints for health checks and Prometheus metrics export.
//!
//! # Endpoints
//! - `GET /health`: health check
//! - `GET /metrics`: interface rates in OpenMetrics format

pub mod handlers;

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::config::Config;
use crate::measure::Measure;
use crate::metrics::MetricsRegistry;
use crate::worker::WorkerRegistry;

/// Application state shared with endpoints
pub struct AppState {
    pub config: Config,
    pub metrics: MetricsRegistry,
    pub workers: WorkerRegistry,
    pub measures: Vec<Measure>,
}

/// Creates the main Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}
