// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Mock Keenetic router for integration tests
//!
//! Runs on its own thread and runtime so tests can block freely while
//! workers stop and join.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

pub const CHALLENGE: &str = "abc123";
pub const REALM: &str = "Keenetic";
pub const LOGIN: &str = "admin";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct MockRouter {
    pub auth_gets: AtomicUsize,
    pub logins_ok: AtomicUsize,
    pub logins_failed: AtomicUsize,
    pub logouts: AtomicUsize,
    pub polls: AtomicUsize,
    pub reject_next_poll: AtomicBool,
    /// Raw body returned by the next polls instead of rrd data
    pub body_override: Mutex<Option<String>>,
    /// (rx, tx) per requested interface name
    pub rates: Mutex<Vec<(String, f64, f64)>>,
    pub last_poll_body: Mutex<Option<Value>>,
    /// Poll body exactly as received
    pub last_poll_text: Mutex<Option<String>>,
    next_sid: AtomicUsize,
    pending_sid: Mutex<Option<String>>,
    session: Mutex<Option<String>>,
}

impl MockRouter {
    pub fn set_rate(&self, interface: &str, rx: f64, tx: f64) {
        let mut rates = self.rates.lock();
        rates.retain(|(name, _, _)| name != interface);
        rates.push((interface.to_string(), rx, tx));
    }

    fn rate(&self, interface: &str) -> Option<(f64, f64)> {
        self.rates
            .lock()
            .iter()
            .find(|(name, _, _)| name == interface)
            .map(|(_, rx, tx)| (*rx, *tx))
    }

    fn has_session(&self, headers: &HeaderMap) -> bool {
        let session = self.session.lock();
        session.is_some() && cookie_sid(headers) == *session
    }
}

fn cookie_sid(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix("sid="))
        .map(ToString::to_string)
        .next()
}

/// Router-side digest computation, independent of the client code
pub fn expected_digest(password: &str) -> String {
    let inner = format!("{:x}", md5::compute(format!("{LOGIN}:{REALM}:{password}")));
    hex::encode(Sha256::digest(format!("{CHALLENGE}{inner}").as_bytes()))
}

async fn auth_get(State(router): State<Arc<MockRouter>>, headers: HeaderMap) -> Response {
    router.auth_gets.fetch_add(1, Ordering::SeqCst);
    if router.has_session(&headers) {
        return StatusCode::OK.into_response();
    }
    let sid = router.next_sid.fetch_add(1, Ordering::SeqCst).to_string();
    *router.pending_sid.lock() = Some(sid.clone());
    (
        StatusCode::UNAUTHORIZED,
        [
            ("X-NDM-Challenge", CHALLENGE.to_string()),
            ("X-NDM-Realm", REALM.to_string()),
            ("Set-Cookie", format!("sid={sid}; Path=/")),
        ],
    )
        .into_response()
}

async fn auth_post(
    State(router): State<Arc<MockRouter>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let sid = cookie_sid(&headers);
    let pending = router.pending_sid.lock().clone();
    let credentials_ok = body["login"] == LOGIN && body["password"] == expected_digest(PASSWORD);

    if sid.is_some() && sid == pending && credentials_ok {
        *router.session.lock() = sid;
        router.logins_ok.fetch_add(1, Ordering::SeqCst);
        StatusCode::OK
    } else {
        router.logins_failed.fetch_add(1, Ordering::SeqCst);
        StatusCode::UNAUTHORIZED
    }
}

async fn auth_delete(State(router): State<Arc<MockRouter>>) -> StatusCode {
    *router.session.lock() = None;
    router.logouts.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn rci(
    State(router): State<Arc<MockRouter>>,
    headers: HeaderMap,
    text: String,
) -> Response {
    let Ok(body) = serde_json::from_str::<Value>(&text) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if !router.has_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if router.reject_next_poll.swap(false, Ordering::SeqCst) {
        *router.session.lock() = None;
        return StatusCode::UNAUTHORIZED.into_response();
    }
    router.polls.fetch_add(1, Ordering::SeqCst);
    *router.last_poll_body.lock() = Some(body.clone());
    *router.last_poll_text.lock() = Some(text);

    if let Some(raw) = router.body_override.lock().clone() {
        return (StatusCode::OK, raw).into_response();
    }

    let records: Vec<Value> = body
        .as_array()
        .map(|queries| {
            queries
                .iter()
                .map(|q| {
                    let name = q["name"].as_str().unwrap_or_default();
                    match (router.rate(name), q["attribute"].as_str()) {
                        (Some((rx, _)), Some("rxspeed")) => json!({ "data": [{ "t": 0, "v": rx }] }),
                        (Some((_, tx)), Some("txspeed")) => json!({ "data": [{ "t": 0, "v": tx }] }),
                        _ => json!({
                            "status": [{ "status": "error", "message": format!("unknown interface {name}") }]
                        }),
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    (StatusCode::OK, Json(Value::Array(records))).into_response()
}

async fn interface_stat(
    State(router): State<Arc<MockRouter>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !router.has_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    router.polls.fetch_add(1, Ordering::SeqCst);
    let elements: Vec<Value> = body
        .as_array()
        .map(|queries| {
            queries
                .iter()
                .map(|q| {
                    let name = q["name"].as_str().unwrap_or_default();
                    let (rx, tx) = router.rate(name).unwrap_or_default();
                    json!({ "name": name, "stats": { "rxspeed": rx, "txspeed": tx.to_string() } })
                })
                .collect()
        })
        .unwrap_or_default();
    (StatusCode::OK, Json(Value::Array(elements))).into_response()
}

/// Starts the mock and returns its base URL
pub fn start() -> (String, Arc<MockRouter>) {
    let router = Arc::new(MockRouter::default());
    let app = Router::new()
        .route("/auth", get(auth_get).post(auth_post).delete(auth_delete))
        .route("/rci/", post(rci))
        .route("/rci/show/interface/stat", post(interface_stat))
        .with_state(router.clone());

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    (format!("http://{addr}"), router)
}

/// Polls `condition` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}
