//! In-process router tests: handlers plus request instrumentation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use vitals_core::metrics::{Collector, Registry};
use vitals_core::{Result, VitalsError};
use vitals_server::{
    app_state::AppState,
    config::ServerConfig,
    ops::{Greeting, Health},
    router,
};

struct Resp {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

fn app() -> (AppState, Router) {
    let state = AppState::new(ServerConfig::default()).unwrap();
    (state.clone(), router::build_router(state))
}

/// Sends a request and reads the body to the end, which completes the request.
async fn send(app: &Router, method: Method, path: &str) -> Resp {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    Resp {
        status,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Value of the sample line starting with `prefix ` in an exposition.
fn sample(text: &str, prefix: &str) -> Option<f64> {
    text.lines()
        .find_map(|l| l.strip_prefix(prefix)?.strip_prefix(' '))
        .map(|v| v.parse().unwrap())
}

#[tokio::test]
async fn greeting_returns_message_version_timestamp() {
    let (_, app) = app();
    let resp = send(&app, Method::GET, "/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));

    let g: Greeting = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(g.message, "Hello from vitals");
    assert_eq!(g.version, env!("CARGO_PKG_VERSION"));
    assert!(g.timestamp.ends_with('Z'));
    chrono::DateTime::parse_from_rfc3339(&g.timestamp).unwrap();
}

#[tokio::test]
async fn health_reports_non_decreasing_uptime() {
    let (_, app) = app();
    let first: Health = serde_json::from_str(&send(&app, Method::GET, "/health").await.body).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let resp = send(&app, Method::GET, "/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    let second: Health = serde_json::from_str(&resp.body).unwrap();

    assert_eq!(first.status, "healthy");
    assert!(first.uptime >= 0.0);
    assert!(second.uptime >= first.uptime);
}

#[tokio::test]
async fn greeting_then_metrics_exposes_one_request() {
    let (_, app) = app();
    send(&app, Method::GET, "/").await;

    let resp = send(&app, Method::GET, "/metrics").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.content_type.as_deref(),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    assert!(resp
        .body
        .contains("http_requests_total{method=\"GET\",route=\"/\",status=\"200\"} 1\n"));
    assert!(resp
        .body
        .contains("http_request_duration_seconds_count{method=\"GET\",route=\"/\"} 1\n"));
}

#[tokio::test]
async fn n_requests_count_exactly_n() {
    let (state, app) = app();
    for _ in 0..7 {
        send(&app, Method::GET, "/").await;
    }

    let http = state.http_metrics();
    assert_eq!(http.requests.get(&["GET", "/", "200"]), 7);
    assert_eq!(http.duration.snapshot(&["GET", "/"]).unwrap().count, 7);

    let text = send(&app, Method::GET, "/metrics").await.body;
    let exposed = sample(&text, "http_requests_total{method=\"GET\",route=\"/\",status=\"200\"}");
    assert_eq!(exposed, Some(7.0));
}

#[tokio::test]
async fn every_route_and_outcome_is_recorded_once() {
    let (state, app) = app();
    assert_eq!(send(&app, Method::GET, "/health").await.status, StatusCode::OK);
    assert_eq!(send(&app, Method::GET, "/nope").await.status, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, Method::POST, "/").await.status, StatusCode::METHOD_NOT_ALLOWED);
    send(&app, Method::GET, "/metrics").await;

    let http = state.http_metrics();
    assert_eq!(http.requests.get(&["GET", "/health", "200"]), 1);
    assert_eq!(http.requests.get(&["GET", "/nope", "404"]), 1);
    assert_eq!(http.requests.get(&["POST", "/", "405"]), 1);
    assert_eq!(http.requests.get(&["GET", "/metrics", "200"]), 1);

    for (m, r) in [("GET", "/health"), ("GET", "/nope"), ("POST", "/"), ("GET", "/metrics")] {
        assert_eq!(http.duration.snapshot(&[m, r]).unwrap().count, 1, "{m} {r}");
    }
}

#[tokio::test]
async fn unread_body_records_once_when_dropped() {
    let (state, app) = app();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Response produced but not yet sent: nothing recorded.
    let http = state.http_metrics();
    assert_eq!(http.requests.get(&["GET", "/health", "200"]), 0);
    assert!(http.duration.snapshot(&["GET", "/health"]).is_none());

    // The server drops the body when the client goes away.
    drop(resp);
    assert_eq!(http.requests.get(&["GET", "/health", "200"]), 1);
    assert_eq!(http.duration.snapshot(&["GET", "/health"]).unwrap().count, 1);
}

#[tokio::test]
async fn not_found_body_is_json_error() {
    let (_, app) = app();
    let resp = send(&app, Method::GET, "/missing/42").await;
    let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(v["code"], "NOT_FOUND");
    assert!(v["msg"].as_str().unwrap().contains("/missing/42"));
}

#[tokio::test]
async fn raw_path_is_used_as_route_label() {
    let (state, app) = app();
    send(&app, Method::GET, "/users/1").await;
    send(&app, Method::GET, "/users/2").await;

    let http = state.http_metrics();
    assert_eq!(http.requests.get(&["GET", "/users/1", "404"]), 1);
    assert_eq!(http.requests.get(&["GET", "/users/2", "404"]), 1);
}

#[tokio::test]
async fn consecutive_scrapes_are_stable() {
    let (_, app) = app();
    send(&app, Method::GET, "/").await;
    send(&app, Method::GET, "/").await;

    let first = send(&app, Method::GET, "/metrics").await.body;
    let second = send(&app, Method::GET, "/metrics").await.body;

    let counter = "http_requests_total{method=\"GET\",route=\"/\",status=\"200\"}";
    assert_eq!(sample(&first, counter), Some(2.0));
    assert_eq!(sample(&first, counter), sample(&second, counter));

    let count = "http_request_duration_seconds_count{method=\"GET\",route=\"/\"}";
    assert_eq!(sample(&first, count), sample(&second, count));

    // The first scrape itself shows up in the second.
    let scrape = "http_requests_total{method=\"GET\",route=\"/metrics\",status=\"200\"}";
    assert_eq!(sample(&first, scrape), None);
    assert_eq!(sample(&second, scrape), Some(1.0));
}

#[tokio::test]
async fn exposed_buckets_are_cumulative() {
    let (_, app) = app();
    for _ in 0..3 {
        send(&app, Method::GET, "/health").await;
    }
    let text = send(&app, Method::GET, "/metrics").await.body;

    let prefix = "http_request_duration_seconds_bucket{method=\"GET\",route=\"/health\",le=";
    let counts: Vec<f64> = text
        .lines()
        .filter_map(|l| l.strip_prefix(prefix))
        .map(|rest| rest.rsplit(' ').next().unwrap().parse().unwrap())
        .collect();

    assert_eq!(counts.len(), 9);
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(counts.last(), Some(&3.0));
}

#[tokio::test]
async fn injected_registry_rejects_second_registration() {
    let registry = Arc::new(Registry::new());
    let _state = AppState::with_registry(ServerConfig::default(), registry.clone()).unwrap();

    let again = AppState::with_registry(ServerConfig::default(), registry);
    assert!(matches!(again, Err(VitalsError::AlreadyRegistered(_))));
}

struct Broken;

impl Collector for Broken {
    fn names(&self) -> Vec<String> {
        vec!["broken".into()]
    }

    fn encode(&self, _out: &mut String) -> Result<()> {
        Err(VitalsError::Internal("collector exploded".into()))
    }
}

#[tokio::test]
async fn export_failure_is_a_500() {
    let registry = Arc::new(Registry::new());
    let state = AppState::with_registry(ServerConfig::default(), registry.clone()).unwrap();
    registry.register(Arc::new(Broken)).unwrap();
    let app = router::build_router(state.clone());

    let resp = send(&app, Method::GET, "/metrics").await;
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(v["code"], "INTERNAL");

    assert_eq!(state.http_metrics().requests.get(&["GET", "/metrics", "500"]), 1);
}
