// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

mod common;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use keenetic_monitor::{
    AppState, Config, Direction, Measure, MetricsRegistry, RouterConfig, WorkerRegistry,
    create_router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn make_state(config: Config, measures: Vec<Measure>, workers: WorkerRegistry) -> Arc<AppState> {
    Arc::new(AppState {
        config,
        metrics: MetricsRegistry::new(),
        workers,
        measures,
    })
}

async fn body_string(resp: axum::response::Response) -> String {
    String::from_utf8(
        resp.into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap()
}

// --- /health endpoint ---

#[tokio::test]
async fn health_returns_ok_and_version() {
    let app = create_router(make_state(Config::default(), vec![], WorkerRegistry::new()));

    let resp = app
        .oneshot(Request::get("/health").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

// --- /metrics endpoint ---

#[tokio::test]
async fn metrics_returns_200_with_openmetrics_content_type() {
    let app = create_router(make_state(Config::default(), vec![], WorkerRegistry::new()));

    let resp = app
        .oneshot(Request::get("/metrics").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(
        ct.contains("openmetrics-text"),
        "Expected OpenMetrics content-type, got: {ct}"
    );
    let body = body_string(resp).await;
    assert!(body.contains("keenetic_workers_live 0"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn metrics_reports_measure_values() {
    let (url, router) = common::start();
    router.set_rate("ISP", 5_000_000.0, 1_000_000.0);

    let mut section = RouterConfig::new("home", common::PASSWORD);
    section.url = url;
    let config = Config {
        routers: vec![section],
        ..Config::default()
    };
    let workers = WorkerRegistry::new();
    let measures = vec![
        Measure::new(&workers, &config, "home", "ISP", Direction::Download).unwrap(),
        Measure::new(&workers, &config, "home", "ISP", Direction::Upload).unwrap(),
    ];
    let probe = measures[0].worker().clone();
    let state = make_state(config, measures, workers);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(8);
    while probe.download_rate("ISP") != 5.0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let resp = create_router(state.clone())
        .oneshot(Request::get("/metrics").body(String::new()).unwrap())
        .await
        .unwrap();
    let body = body_string(resp).await;

    assert!(body.contains("keenetic_workers_live 1"), "{body}");
    assert!(
        body.lines().any(|l| l.starts_with("keenetic_interface_rate{")
            && l.contains(r#"direction="download""#)
            && l.contains(r#"interface="ISP""#)
            && l
                .split_whitespace()
                .last()
                .and_then(|v| v.parse::<f64>().ok())
                == Some(5.0)),
        "{body}"
    );

    // Worker threads are joined on the last drop
    drop(probe);
    tokio::task::spawn_blocking(move || drop(state)).await.unwrap();
}
