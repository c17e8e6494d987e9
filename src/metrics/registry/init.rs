// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Registry initialization and metric registration

use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{MetricsRegistry, RateGauge};
use crate::metrics::labels::RateLabels;

impl MetricsRegistry {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let interface_rate = Family::<RateLabels, RateGauge>::default();
        registry.register(
            "keenetic_interface_rate",
            "Latest interface rate in the configured divided unit",
            interface_rate.clone(),
        );

        let workers_live = Gauge::default();
        registry.register(
            "keenetic_workers_live",
            "Number of routers with a running polling worker",
            workers_live.clone(),
        );

        let scrape_duration_milliseconds = RateGauge::default();
        registry.register(
            "keenetic_scrape_duration_milliseconds",
            "Time spent reading all measures for the last scrape",
            scrape_duration_milliseconds.clone(),
        );

        Self {
            registry: Arc::new(Mutex::new(registry)),
            interface_rate,
            workers_live,
            scrape_duration_milliseconds,
        }
    }
}
