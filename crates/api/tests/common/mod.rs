#![allow(dead_code)]

use std::sync::Arc;

use aquawatch_api::config::ServerConfig;
use aquawatch_api::router::build_app_router;
use aquawatch_api::state::AppState;
use aquawatch_core::quality::BreachTracker;
use aquawatch_db::{MemoryStore, QualityStore};
use aquawatch_events::{Broadcaster, LogNotifier};
use aquawatch_pipeline::IngestPipeline;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Application state backed by the in-memory store and the logging notifier.
pub fn test_state() -> AppState {
    let config = test_config();
    let store: Arc<dyn QualityStore> = Arc::new(MemoryStore::new());
    let tracker = Arc::new(BreachTracker::new(
        config.monitor.safe_range,
        config.monitor.durations.clone(),
    ));
    let broadcaster = Arc::new(Broadcaster::new(config.subscriber_buffer));
    let pipeline = IngestPipeline::new(store, tracker, broadcaster, Arc::new(LogNotifier));

    AppState {
        config: Arc::new(config),
        pipeline,
    }
}

/// Build the full application router around `state`, with the same
/// middleware stack production uses.
pub fn build_test_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
