// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Scrape-time refresh of gauges from measures

use crate::error::{AppError, Result};
use crate::measure::Measure;
use crate::metrics::labels::RateLabels;
use prometheus_client::encoding::text::encode;

use super::MetricsRegistry;

impl MetricsRegistry {
    /// Renders the registry in OpenMetrics text format
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Metrics`] if encoding fails.
    pub async fn encode_metrics(&self) -> Result<String> {
        let registry = self.registry.lock().await;
        let mut buffer = String::new();
        encode(&mut buffer, &registry).map_err(|e| AppError::Metrics(e.to_string()))?;
        Ok(buffer)
    }

    /// Reads every measure once and publishes the values
    pub fn observe(&self, measures: &[Measure], live_workers: usize) {
        let start = std::time::Instant::now();
        for measure in measures {
            let labels = RateLabels {
                router: measure.router().to_string(),
                interface: measure.interface().to_string(),
                direction: measure.direction().to_string(),
            };
            self.interface_rate.get_or_create(&labels).set(measure.value());
        }

        #[allow(clippy::cast_possible_wrap)]
        self.workers_live.set(live_workers as i64);
        self.scrape_duration_milliseconds
            .set(start.elapsed().as_secs_f64() * 1000.0);
    }

    #[cfg(test)]
    pub(crate) fn rate(&self, labels: &RateLabels) -> f64 {
        self.interface_rate.get_or_create(labels).get()
    }
}
