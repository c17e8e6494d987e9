// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prometheus view of the measures served by the binary

mod labels;
mod registry;


/// Labels for published rates
pub use labels::RateLabels;

/// Prometheus metrics registry
pub use registry::MetricsRegistry;
