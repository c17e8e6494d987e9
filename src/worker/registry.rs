// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Deduplication of workers by router identity

use std::sync::Arc;

use parking_lot::Mutex;

use super::{PollingWorker, WorkerHandle, WorkerMap, WorkerState};
use crate::config::Settings;
use crate::error::Result;

/// Maps router identities to weakly-held workers
///
/// Every consumer of the same identity shares one worker. The registry never
/// keeps a worker alive; when the last handle is dropped the worker stops and
/// its entry is removed.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    workers: Arc<Mutex<WorkerMap>>,
}

impl WorkerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live worker for `identity`, or builds and starts one
    ///
    /// `settings_factory` is only invoked when no live worker exists.
    ///
    /// # Errors
    ///
    /// Propagates the factory's error (normally [`crate::AppError::Config`])
    /// and worker construction or start failures. No worker is registered
    /// in that case.
    pub fn acquire<F>(&self, identity: &str, settings_factory: F) -> Result<WorkerHandle>
    where
        F: FnOnce() -> Result<Settings>,
    {
        // Declared before the guard so it is released after the lock
        let mut _stopped: Option<WorkerHandle> = None;
        let mut workers = self.workers.lock();

        if let Some(worker) = workers.get(identity).and_then(|w| w.upgrade()) {
            if worker.state() != WorkerState::Stopped {
                tracing::trace!("Reusing worker for router '{}'", identity);
                return Ok(worker);
            }
            // Stopped workers never run again; replace it
            tracing::debug!("Worker for router '{}' was stopped, replacing", identity);
            _stopped = Some(worker);
        }

        let settings = settings_factory().inspect_err(|e| {
            tracing::error!("Cannot start worker for router '{}': {}", identity, e);
        })?;

        let worker = Arc::new(PollingWorker::with_registry(
            identity.to_string(),
            settings,
            Arc::downgrade(&self.workers),
        )?);

        if let Err(e) = worker.start() {
            // Dropping the worker takes the registry lock
            drop(workers);
            drop(worker);
            tracing::error!("Failed to start worker for router '{}': {}", identity, e);
            return Err(e);
        }

        workers.insert(identity.to_string(), Arc::downgrade(&worker));
        tracing::info!("Started polling router '{}'", identity);
        Ok(worker)
    }

    /// Number of identities with a live worker
    pub fn live_workers(&self) -> usize {
        self.workers
            .lock()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.workers
            .lock()
            .get(identity)
            .is_some_and(|w| w.strong_count() > 0)
    }
}
