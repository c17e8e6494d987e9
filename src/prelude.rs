// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! ```rust
//! use keenetic_monitor::prelude::*;
//! ```

// Core types
pub use crate::config::{Config, PollMode, RouterConfig, Settings};
pub use crate::error::{AppError, Result};

// Consumers
pub use crate::measure::{Direction, Measure, build_measures};

// Workers
pub use crate::keenetic::{InterfaceRates, MetricsSnapshot};
pub use crate::worker::{PollingWorker, WorkerHandle, WorkerRegistry, WorkerState};
