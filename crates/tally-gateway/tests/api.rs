//! In-process HTTP tests: the router is driven with `oneshot`, no socket.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures_util::future::join_all;
use serde_json::{json, Value};
use tower::ServiceExt;

use tally_core::{Result, Snapshot, TallyError};
use tally_gateway::{
    app_state::AppState,
    config::{StoreBackend, TallyConfig},
    router::{build_router, init_app},
    store::{CounterStore, MemoryStore},
};

fn test_config() -> TallyConfig {
    let mut cfg = TallyConfig::default();
    cfg.store.backend = StoreBackend::Memory;
    cfg.server.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../public").into();
    cfg
}

async fn app_with(store: Arc<dyn CounterStore>) -> Router {
    store.initialize().await.unwrap();
    build_router(AppState::new(test_config(), store))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Backend that refuses every command.
struct DownStore;

#[async_trait]
impl CounterStore for DownStore {
    fn backend(&self) -> &'static str {
        "down"
    }
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }
    async fn read_all(&self) -> Result<Snapshot> {
        Err(TallyError::Store("connection refused".into()))
    }
    async fn increment(&self, _key: &str, _delta: i64) -> Result<i64> {
        Err(TallyError::Store("connection refused".into()))
    }
    async fn ping(&self) -> Result<()> {
        Err(TallyError::Store("connection refused".into()))
    }
}

#[tokio::test]
async fn end_to_end_scenario() {
    let app = app_with(Arc::new(MemoryStore::new())).await;

    let (status, body) = get_json(&app, "/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"header": 0, "left": 0, "article": 0, "right": 0, "footer": 0})
    );

    let (status, body) = get_json(&app, "/update/left/5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"header": 0, "left": 5, "article": 0, "right": 0, "footer": 0})
    );

    let (status, body) = get_json(&app, "/update/left/-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["left"], 3);

    let (_, body) = get_json(&app, "/data").await;
    assert_eq!(body["left"], 3);
}

#[tokio::test]
async fn data_always_has_exactly_five_counters() {
    let store = MemoryStore::with_values([("header", 2_i64), ("sidebar", 8)]);
    let app = build_router(AppState::new(test_config(), Arc::new(store)));

    let (status, body) = get_json(&app, "/data").await;
    assert_eq!(status, StatusCode::OK);
    let obj = body.as_object().unwrap();
    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 5);
    for k in ["header", "left", "article", "right", "footer"] {
        assert!(obj.contains_key(k), "missing {k}");
    }
    assert_eq!(body["header"], 2);
    assert_eq!(body["right"], 0);
}

#[tokio::test]
async fn unknown_key_is_stored_but_not_reported() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone()).await;

    let (status, body) = get_json(&app, "/update/bogus/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("bogus").is_none());
    assert_eq!(body.as_object().unwrap().len(), 5);
    assert_eq!(store.get("bogus"), Some(1));

    let (_, body) = get_json(&app, "/data").await;
    assert!(body.get("bogus").is_none());
}

#[tokio::test]
async fn non_numeric_value_is_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone()).await;

    for uri in ["/update/left/abc", "/update/left/1.5", "/update/left/NaN"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "BAD_REQUEST");
    }
    assert_eq!(store.get("left"), Some(0));
}

#[tokio::test]
async fn undecodable_path_segment_is_json_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone()).await;

    for uri in ["/update/left/%FF", "/update/%FF/1"] {
        let res = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
        let content_type = res.headers()[axum::http::header::CONTENT_TYPE].clone();
        assert_eq!(content_type, "application/json", "{uri}");

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "BAD_REQUEST", "{uri}");
        assert!(body["message"].is_string());
    }
    assert_eq!(store.len(), 5);
    assert_eq!(store.get("left"), Some(0));
}

/// Backend whose startup preparation fails.
struct UninitializableStore;

#[async_trait]
impl CounterStore for UninitializableStore {
    fn backend(&self) -> &'static str {
        "uninitializable"
    }
    async fn initialize(&self) -> Result<()> {
        Err(TallyError::Store("READONLY replica".into()))
    }
    async fn read_all(&self) -> Result<Snapshot> {
        Ok(Snapshot::default())
    }
    async fn increment(&self, _key: &str, delta: i64) -> Result<i64> {
        Ok(delta)
    }
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn failed_initialize_produces_no_app() {
    match init_app(test_config(), Arc::new(UninitializableStore)).await {
        Ok(_) => panic!("app must not be built when initialize fails"),
        Err(e) => assert_eq!(e.client_code().as_str(), "STORE_UNAVAILABLE"),
    }
}

#[tokio::test]
async fn init_app_prepares_counters_before_serving() {
    let store = Arc::new(MemoryStore::new());
    let (state, app) = init_app(test_config(), store.clone()).await.unwrap();
    assert_eq!(store.len(), 5);
    assert!(!state.is_draining());

    let (status, body) = get_json(&app, "/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["footer"], 0);
}

#[tokio::test]
async fn store_failure_is_500_with_generic_message() {
    let app = app_with(Arc::new(DownStore)).await;

    let (status, body) = get_json(&app, "/data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "STORE_UNAVAILABLE");
    assert_eq!(body["message"], "failed to retrieve data");

    let (status, body) = get_json(&app, "/update/left/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "failed to update data");
    assert!(!body.to_string().contains("connection refused"));

    // the service keeps answering after a failed request
    let (status, _) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "store unavailable");

    // readiness pings stay out of the store operation series
    let (_, text) = get(&app, "/metrics").await;
    assert!(text.contains(r#"tally_store_ops_total{op="read_all",outcome="error"} 1"#));
    assert!(!text.contains(r#"op="ping""#));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_over_http_lose_nothing() {
    let app = app_with(Arc::new(MemoryStore::new())).await;

    let n = 200;
    let reqs = (0..n).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/update/article/1").await.0 })
    });
    for status in join_all(reqs).await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    let (_, body) = get_json(&app, "/data").await;
    assert_eq!(body["article"], n);
}

#[tokio::test]
async fn static_front_end_is_served() {
    let app = app_with(Arc::new(MemoryStore::new())).await;

    let (status, body) = get(&app, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/update/"));

    let (status, _) = get(&app, "/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn readiness_and_metrics() {
    let state = AppState::new(test_config(), Arc::new(MemoryStore::new()));
    let app = build_router(state.clone());

    let (status, body) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");

    get(&app, "/update/header/2").await;
    let (status, text) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains(r#"tally_http_requests_total{route="/update/:key/:value",status="200"} 1"#));
    assert!(text.contains(r#"tally_store_ops_total{op="increment",outcome="ok"} 1"#));

    state.set_draining();
    let (status, body) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "draining");
}
