use aquawatch_db::StoreStats;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Dashboard summary.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub store: StoreStats,
    /// Connected live-dashboard subscribers.
    pub subscribers: usize,
    /// Devices with an ongoing breach episode.
    pub breaching_devices: usize,
}

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<DataResponse<StatsResponse>>> {
    let store = state.store().stats().await?;
    let stats = StatsResponse {
        store,
        subscribers: state.broadcaster().subscriber_count().await,
        breaching_devices: state.pipeline.tracker().tracked_devices(),
    };
    Ok(Json(DataResponse { data: stats }))
}
