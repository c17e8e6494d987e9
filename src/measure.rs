// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Per-display-element reader of a shared worker

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::Result;
use crate::worker::{WorkerHandle, WorkerRegistry};

/// Which rate a measure reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Download,
    Upload,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = std::convert::Infallible;

    /// `"upload"` selects upload, anything else download
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("upload") {
            Direction::Upload
        } else {
            Direction::Download
        })
    }
}

/// One consumer of a router's rates
///
/// Holding a measure keeps the router's worker alive.
pub struct Measure {
    worker: WorkerHandle,
    interface: String,
    direction: Direction,
}

impl Measure {
    /// Acquires the shared worker for `identity` and binds it to one reading
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Config`] if the identity has no usable
    /// configuration section.
    pub fn new(
        registry: &WorkerRegistry,
        config: &Config,
        identity: &str,
        interface: impl Into<String>,
        direction: Direction,
    ) -> Result<Self> {
        let worker = registry.acquire(identity, || config.settings_for(identity))?;
        Ok(Self::from_worker(worker, interface, direction))
    }

    pub fn from_worker(
        worker: WorkerHandle,
        interface: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            worker,
            interface: interface.into(),
            direction,
        }
    }

    pub fn router(&self) -> &str {
        self.worker.identity()
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn worker(&self) -> &WorkerHandle {
        &self.worker
    }

    /// Current rate, zero until the first successful poll
    pub fn value(&self) -> f64 {
        match self.direction {
            Direction::Download => self.worker.download_rate(&self.interface),
            Direction::Upload => self.worker.upload_rate(&self.interface),
        }
    }
}

/// One download and one upload measure per configured interface
///
/// A router whose section fails to acquire a worker is skipped entirely;
/// the registry has already logged why.
pub fn build_measures(registry: &WorkerRegistry, config: &Config) -> Vec<Measure> {
    let mut measures = Vec::new();
    'router: for router in &config.routers {
        for interface in &router.interfaces {
            for direction in [Direction::Download, Direction::Upload] {
                match Measure::new(registry, config, &router.name, interface.clone(), direction) {
                    Ok(measure) => measures.push(measure),
                    Err(_) => continue 'router,
                }
            }
        }
    }
    measures
}
