// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # Keenetic Monitor
//!
//! Background polling of Keenetic router traffic rates.
//!
//! One worker per router identity logs in through the challenge/response
//! `/auth` scheme, polls the RCI API every second and caches the latest
//! download/upload rates. Any number of consumers share that worker through
//! a [`WorkerRegistry`].
//!
//! ## Main modules
//! - `api`: HTTP API handlers
//! - `config`: configuration management
//! - `error`: error types
//! - `keenetic`: router authentication, requests and response extraction
//! - `measure`: consumer facade reading a shared worker
//! - `metrics`: Prometheus registry for the binary
//! - `worker`: polling workers, metrics store and registry
//! - `prelude`: commonly used types and traits

mod api;
mod config;
mod error;
mod keenetic;
mod measure;
mod metrics;
mod worker;
pub mod prelude;

// Re-export commonly used types
/// Application configuration
pub use config::{
    Config, CustomRequest, DEFAULT_DIVIDER, PollMode, ProxySettings, RequestType, RouterConfig,
    Settings, parse_interface_list,
};

/// Application error and result type
pub use error::{AppError, ExtractError, Result};

/// HTTP API router and state
pub use api::{AppState, create_router};

/// Router protocol pieces
pub use keenetic::{
    AUTH_COOLDOWN, AuthSession, AuthState, InterfaceRates, LoginRequest, MetricsSnapshot,
    PollRequest, RrdQuery, build_poll_request, extract, login_digest, resolve_path, rrd_queries,
    to_pointer,
};

/// Consumer facade
pub use measure::{Direction, Measure, build_measures};

/// Metrics registry and labels
pub use metrics::{MetricsRegistry, RateLabels};

/// Polling workers
pub use worker::{
    MetricsStore, POLL_INTERVAL, PollingWorker, WorkerHandle, WorkerRegistry, WorkerState,
};
