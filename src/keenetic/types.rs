// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Type definitions for Keenetic traffic metrics

use std::collections::BTreeMap;

/// Download/upload rates of one interface, already divided
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InterfaceRates {
    pub download: f64,
    pub upload: f64,
}

impl InterfaceRates {
    #[must_use]
    pub fn new(download: f64, upload: f64) -> Self {
        Self { download, upload }
    }
}

/// Result of one successful poll, keyed by interface name
pub type MetricsSnapshot = BTreeMap<String, InterfaceRates>;
