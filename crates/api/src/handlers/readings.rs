//! Handlers for sensor reading ingestion and queries.

use aquawatch_core::error::CoreError;
use aquawatch_core::reading::{NewReading, Reading};
use aquawatch_pipeline::IngestOutcome;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppResult;
use crate::query::{
    device_filter, resolve_limit, DeviceQuery, ReadingsQuery, DEFAULT_READINGS_LIMIT,
    MAX_READINGS_LIMIT,
};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/readings
///
/// Validate and ingest one reading from a device.
pub async fn create_reading(
    State(state): State<AppState>,
    Json(input): Json<NewReading>,
) -> AppResult<(StatusCode, Json<DataResponse<IngestOutcome>>)> {
    let outcome = state.pipeline.ingest(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// GET /api/v1/readings?limit=&device_id=
///
/// Most recent readings, newest first.
pub async fn list_readings(
    State(state): State<AppState>,
    Query(params): Query<ReadingsQuery>,
) -> AppResult<Json<DataResponse<Vec<Reading>>>> {
    let limit = resolve_limit(params.limit, DEFAULT_READINGS_LIMIT, MAX_READINGS_LIMIT)?;
    let readings = state
        .store()
        .recent_readings(limit, device_filter(params.device_id.as_deref()))
        .await?;
    Ok(Json(DataResponse { data: readings }))
}

/// GET /api/v1/readings/latest?device_id=
pub async fn latest_reading(
    State(state): State<AppState>,
    Query(params): Query<DeviceQuery>,
) -> AppResult<Json<DataResponse<Reading>>> {
    let device_id = device_filter(params.device_id.as_deref());
    let reading = state
        .store()
        .latest_reading(device_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "reading",
            id: device_id.map_or_else(|| "any device".to_string(), |id| format!("device {id}")),
        })?;
    Ok(Json(DataResponse { data: reading }))
}
