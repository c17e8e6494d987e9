// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Metrics registry and update logic

mod init;
mod scrape;

use crate::metrics::labels::RateLabels;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::sync::Mutex;

type RateGauge = Gauge<f64, AtomicU64>;

#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Arc<Mutex<Registry>>,
    interface_rate: Family<RateLabels, RateGauge>,
    workers_live: Gauge,
    scrape_duration_milliseconds: RateGauge,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
