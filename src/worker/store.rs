// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Latest rates published by a worker

use std::sync::Arc;

use parking_lot::RwLock;

use crate::keenetic::{InterfaceRates, MetricsSnapshot};

/// Thread-safe holder of the last successful snapshot
///
/// Snapshots are replaced whole, so readers never see values from two polls.
#[derive(Clone, Default)]
pub struct MetricsStore {
    current: Arc<RwLock<Arc<MetricsSnapshot>>>,
}

impl MetricsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<MetricsSnapshot> {
        self.current.read().clone()
    }

    pub fn replace(&self, snapshot: MetricsSnapshot) {
        tracing::trace!("Publishing rates for {} interface(s)", snapshot.len());
        *self.current.write() = Arc::new(snapshot);
    }

    pub fn clear(&self) {
        let mut current = self.current.write();
        if !current.is_empty() {
            *current = Arc::new(MetricsSnapshot::new());
        }
    }

    /// Rates for `interface`, or for the first entry when `interface` is empty
    ///
    /// Unknown interfaces and an empty store read as zero.
    pub fn rates(&self, interface: &str) -> InterfaceRates {
        let snapshot = self.snapshot();
        if interface.is_empty() {
            snapshot.values().next().copied().unwrap_or_default()
        } else {
            snapshot.get(interface).copied().unwrap_or_default()
        }
    }

    pub fn download_rate(&self, interface: &str) -> f64 {
        self.rates(interface).download
    }

    pub fn upload_rate(&self, interface: &str) -> f64 {
        self.rates(interface).upload
    }
}
