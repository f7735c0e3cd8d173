use aquawatch_core::alert::Alert;
use axum::extract::{Query, State};
use axum::Json;

use crate::error::AppResult;
use crate::query::{resolve_limit, AlertsQuery, DEFAULT_ALERTS_LIMIT, MAX_ALERTS_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/alerts?limit=
///
/// Most recent alerts, newest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertsQuery>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let limit = resolve_limit(params.limit, DEFAULT_ALERTS_LIMIT, MAX_ALERTS_LIMIT)?;
    let alerts = state.store().recent_alerts(limit).await?;
    Ok(Json(DataResponse { data: alerts }))
}
