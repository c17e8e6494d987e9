// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Authenticate, poll, sleep: the body of a worker thread

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::sync::watch;

use super::store::MetricsStore;
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::keenetic::{AuthSession, MetricsSnapshot, build_poll_request, extract};

/// Pause between polls and between login attempts
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the background loop owns
pub(super) struct PollContext {
    pub(super) identity: String,
    pub(super) settings: Arc<Settings>,
    pub(super) client: Client,
    pub(super) store: MetricsStore,
    pub(super) shutdown: watch::Receiver<bool>,
}

/// Thread entry point: drives the loop on a private single-threaded runtime
pub(super) fn run_worker_thread(ctx: PollContext) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime for router '{}': {}", ctx.identity, e);
            return;
        }
    };
    runtime.block_on(run(ctx));
}

/// Sleeps one interval; returns `true` once stop has been requested
async fn pause(shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(POLL_INTERVAL) => *shutdown.borrow(),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

pub(super) async fn run(ctx: PollContext) {
    let PollContext {
        identity,
        settings,
        client,
        store,
        mut shutdown,
    } = ctx;
    let mut auth = AuthSession::new(client.clone(), settings.clone());

    tracing::debug!("Polling loop for router '{}' started", identity);

    loop {
        if *shutdown.borrow() {
            break;
        }

        if !auth.is_authenticated() && (auth.is_on_cooldown() || !auth.authenticate().await) {
            if pause(&mut shutdown).await {
                break;
            }
            continue;
        }

        // Login may have taken a while
        if *shutdown.borrow() {
            break;
        }

        let start = std::time::Instant::now();
        match poll_once(&client, &settings).await {
            Ok(snapshot) => {
                tracing::trace!(
                    "Router '{}' polled in {:.3}s, {} interface(s)",
                    identity,
                    start.elapsed().as_secs_f64(),
                    snapshot.len()
                );
                store.replace(snapshot);
            }
            Err(AppError::Unauthorized) => {
                tracing::debug!("Router '{}' session expired, logging in again", identity);
                auth.invalidate();
                store.clear();
            }
            Err(e) => {
                tracing::error!("Failed to get data from router '{}': {}", identity, e);
                store.clear();
            }
        }

        if pause(&mut shutdown).await {
            break;
        }
    }

    auth.logout().await;
    store.clear();
    tracing::debug!("Polling loop for router '{}' stopped", identity);
}

/// Sends one poll request and extracts the snapshot from its response
pub(super) async fn poll_once(client: &Client, settings: &Settings) -> Result<MetricsSnapshot> {
    let request = build_poll_request(settings)?;
    let mut builder = client.request(request.method, &request.url);
    if let Some(body) = request.body {
        builder = builder.header(CONTENT_TYPE, "application/json").body(body);
    }

    let response = builder.send().await?;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized);
    }
    if status != StatusCode::OK {
        return Err(AppError::Router(format!(
            "Response code: {}",
            status.as_u16()
        )));
    }

    let body = response.bytes().await?;
    Ok(extract(&body, settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_is_one_second() {
        assert_eq!(POLL_INTERVAL, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_waits_full_interval() {
        let (_tx, mut rx) = watch::channel(false);
        let start = tokio::time::Instant::now();
        assert!(!pause(&mut rx).await);
        assert!(start.elapsed() >= POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_returns_early_on_stop() {
        let (tx, mut rx) = watch::channel(false);
        tx.send_replace(true);
        let start = tokio::time::Instant::now();
        assert!(pause(&mut rx).await);
        assert!(start.elapsed() < POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(pause(&mut rx).await);
    }

    #[tokio::test]
    async fn test_loop_exits_immediately_when_stopped() {
        let settings = Arc::new(Settings::new(
            "http://127.0.0.1:9",
            "admin",
            "pw",
            vec!["ISP".into()],
        ));
        let (tx, rx) = watch::channel(true);
        let store = MetricsStore::new();
        run(PollContext {
            identity: "test".to_string(),
            settings,
            client: Client::new(),
            store: store.clone(),
            shutdown: rx,
        })
        .await;
        drop(tx);
        assert!(store.snapshot().is_empty());
    }
}
