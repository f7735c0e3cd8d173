use axum::routing::post;
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// POST /{device_id}/reset   -> reset_device
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{device_id}/reset", post(devices::reset_device))
}
