pub mod alerts;
pub mod devices;
pub mod health;
pub mod readings;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                          WebSocket (live dashboard)
/// /readings                    list, ingest
/// /readings/latest             latest reading
/// /alerts                      list
/// /stats                       dashboard summary
/// /devices/{device_id}/reset   clear breach tracking
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/readings", readings::router())
        .nest("/alerts", alerts::router())
        .route("/stats", get(handlers::stats::get_stats))
        .nest("/devices", devices::router())
}
