// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Background polling workers
//!
//! One [`PollingWorker`] per router identity owns a dedicated thread that logs
//! in, polls the configured interfaces every second and publishes the rates
//! into its [`MetricsStore`]. Workers are shared through [`WorkerRegistry`].

mod poll_loop;
mod registry;
mod store;

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use parking_lot::Mutex;
use reqwest::Client;
use tokio::sync::watch;

use crate::config::Settings;
use crate::error::Result;
use crate::keenetic::{MetricsSnapshot, build_client};

use poll_loop::{PollContext, run_worker_thread};

pub use poll_loop::POLL_INTERVAL;
pub use registry::WorkerRegistry;
pub use store::MetricsStore;

/// Shared owning reference to a worker; the last drop stops it
pub type WorkerHandle = Arc<PollingWorker>;

pub(crate) type WorkerMap = HashMap<String, Weak<PollingWorker>>;

/// Lifecycle of a worker, only ever moving forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Running,
    Stopped,
}

struct WorkerInner {
    state: WorkerState,
    client: Option<Client>,
    thread: Option<JoinHandle<()>>,
}

/// Polls one router on its own thread and caches the latest rates
pub struct PollingWorker {
    identity: String,
    settings: Arc<Settings>,
    store: MetricsStore,
    shutdown: watch::Sender<bool>,
    inner: Mutex<WorkerInner>,
    registry: Weak<Mutex<WorkerMap>>,
}

impl PollingWorker {
    /// Creates a worker that is not registered anywhere
    ///
    /// # Errors
    ///
    /// Fails if the HTTP session cannot be set up from `settings`.
    pub fn new(identity: impl Into<String>, settings: Settings) -> Result<Self> {
        Self::with_registry(identity.into(), settings, Weak::new())
    }

    pub(crate) fn with_registry(
        identity: String,
        settings: Settings,
        registry: Weak<Mutex<WorkerMap>>,
    ) -> Result<Self> {
        let client = build_client(&settings)?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            identity,
            settings: Arc::new(settings),
            store: MetricsStore::new(),
            shutdown,
            inner: Mutex::new(WorkerInner {
                state: WorkerState::Created,
                client: Some(client),
                thread: None,
            }),
            registry,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> WorkerState {
        self.inner.lock().state
    }

    /// Spawns the polling thread; later calls are no-ops
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Io`] if the thread cannot be spawned.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != WorkerState::Created {
            tracing::trace!(
                "Worker for '{}' already {:?}, start ignored",
                self.identity,
                inner.state
            );
            return Ok(());
        }
        let Some(client) = inner.client.take() else {
            return Ok(());
        };

        let ctx = PollContext {
            identity: self.identity.clone(),
            settings: self.settings.clone(),
            client,
            store: self.store.clone(),
            shutdown: self.shutdown.subscribe(),
        };

        let spawned = std::thread::Builder::new()
            .name(format!("keenetic-{}", self.identity))
            .spawn(move || run_worker_thread(ctx));

        match spawned {
            Ok(handle) => {
                inner.thread = Some(handle);
                inner.state = WorkerState::Running;
                tracing::debug!("Worker thread for router '{}' spawned", self.identity);
                Ok(())
            }
            Err(e) => {
                inner.state = WorkerState::Stopped;
                Err(e.into())
            }
        }
    }

    /// Signals the loop to stop and waits until its thread has exited
    pub fn stop(&self) {
        let thread = {
            let mut inner = self.inner.lock();
            if inner.state == WorkerState::Stopped {
                return;
            }
            inner.state = WorkerState::Stopped;
            inner.client = None;
            inner.thread.take()
        };

        self.shutdown.send_replace(true);
        if let Some(thread) = thread {
            if thread.join().is_err() {
                tracing::error!("Worker thread for router '{}' panicked", self.identity);
            }
            tracing::debug!("Worker for router '{}' stopped", self.identity);
        }
        self.store.clear();
    }

    pub fn snapshot(&self) -> Arc<MetricsSnapshot> {
        self.store.snapshot()
    }

    /// Download rate of `interface`; empty name reads the first interface, unknown reads 0
    pub fn download_rate(&self, interface: &str) -> f64 {
        self.store.download_rate(interface)
    }

    /// Upload rate of `interface`; empty name reads the first interface, unknown reads 0
    pub fn upload_rate(&self, interface: &str) -> f64 {
        self.store.upload_rate(interface)
    }
}

impl Drop for PollingWorker {
    fn drop(&mut self) {
        self.stop();

        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut workers = registry.lock();
        if workers
            .get(&self.identity)
            .is_some_and(|w| w.strong_count() == 0)
        {
            workers.remove(&self.identity);
            tracing::debug!("Router '{}' removed from registry", self.identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::new("http://127.0.0.1:9", "admin", "pw", vec!["ISP".into()])
    }

    #[test]
    fn test_new_worker_is_created() {
        let worker = PollingWorker::new("home", settings()).unwrap();
        assert_eq!(worker.state(), WorkerState::Created);
        assert_eq!(worker.identity(), "home");
        assert_eq!(worker.settings().interfaces, vec!["ISP"]);
        assert_eq!(worker.download_rate(""), 0.0);
    }

    #[test]
    fn test_start_is_idempotent_and_stop_is_final() {
        let worker = PollingWorker::new("home", settings()).unwrap();
        worker.start().unwrap();
        assert_eq!(worker.state(), WorkerState::Running);
        worker.start().unwrap();
        assert_eq!(worker.state(), WorkerState::Running);

        worker.stop();
        assert_eq!(worker.state(), WorkerState::Stopped);

        worker.start().unwrap();
        assert_eq!(worker.state(), WorkerState::Stopped);
        worker.stop();
    }

    #[test]
    fn test_stop_without_start() {
        let worker = PollingWorker::new("home", settings()).unwrap();
        worker.stop();
        assert_eq!(worker.state(), WorkerState::Stopped);
        worker.start().unwrap();
        assert_eq!(worker.state(), WorkerState::Stopped);
    }

    #[test]
    fn test_unreachable_router_reads_zero() {
        let worker = PollingWorker::new("home", settings()).unwrap();
        worker.start().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(worker.download_rate("ISP"), 0.0);
        assert_eq!(worker.upload_rate("missing"), 0.0);
    }
}
