//! Storage failures surface as sanitized 500 responses.

mod common;

use std::sync::Arc;

use aquawatch_api::state::AppState;
use aquawatch_core::alert::Alert;
use aquawatch_core::quality::BreachTracker;
use aquawatch_core::reading::Reading;
use aquawatch_db::{QualityStore, StoreError, StoreStats};
use aquawatch_events::{Broadcaster, LogNotifier};
use aquawatch_pipeline::IngestPipeline;
use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

/// Store whose every call fails.
struct BrokenStore;

fn broken() -> StoreError {
    StoreError::InvalidRow("connection reset".to_string())
}

#[async_trait]
impl QualityStore for BrokenStore {
    async fn append_reading(&self, _reading: &Reading) -> Result<(), StoreError> {
        Err(broken())
    }

    async fn append_alert(&self, _alert: &Alert) -> Result<(), StoreError> {
        Err(broken())
    }

    async fn recent_readings(
        &self,
        _limit: usize,
        _device_id: Option<&str>,
    ) -> Result<Vec<Reading>, StoreError> {
        Err(broken())
    }

    async fn latest_reading(&self, _device_id: Option<&str>) -> Result<Option<Reading>, StoreError> {
        Err(broken())
    }

    async fn recent_alerts(&self, _limit: usize) -> Result<Vec<Alert>, StoreError> {
        Err(broken())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        Err(broken())
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

fn broken_state() -> AppState {
    let config = common::test_config();
    let pipeline = IngestPipeline::new(
        Arc::new(BrokenStore),
        Arc::new(BreachTracker::default()),
        Arc::new(Broadcaster::default()),
        Arc::new(LogNotifier),
    );
    AppState {
        config: Arc::new(config),
        pipeline,
    }
}

// ---------------------------------------------------------------------------
// Test: ingest on a failing store returns 500 without leaking details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ingest_storage_failure_is_500() {
    let app = common::build_test_app(broken_state());
    let response = post_json(
        app,
        "/api/v1/readings",
        json!({"ph": 7.0, "turbidity": 1.0, "tds": 2.0}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("connection reset"));
}

// ---------------------------------------------------------------------------
// Test: read endpoints and health on a failing store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_endpoints_report_500() {
    let state = broken_state();
    for uri in ["/api/v1/readings", "/api/v1/readings/latest", "/api/v1/alerts", "/api/v1/stats"] {
        let response = get(common::build_test_app(state.clone()), uri).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
    }
}

#[tokio::test]
async fn health_reports_degraded() {
    let json = body_json(get(common::build_test_app(broken_state()), "/health").await).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["storage"], "broken");
    assert_eq!(json["store_healthy"], false);
}
