use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::state::AppState;

/// POST /api/v1/devices/{device_id}/reset
///
/// Clear all breach tracking for a device, e.g. after it was re-provisioned.
/// Succeeds whether or not the device had state.
pub async fn reset_device(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> StatusCode {
    let had_state = state.pipeline.reset_device(&device_id);
    tracing::info!(device_id = %device_id, had_state, "Device reset requested");
    StatusCode::NO_CONTENT
}
