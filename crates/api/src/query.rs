//! Query parameter types for the listing endpoints.

use serde::Deserialize;

use crate::error::AppError;

/// Default number of readings returned by `GET /readings`.
pub const DEFAULT_READINGS_LIMIT: usize = 50;
/// Largest accepted `limit` for `GET /readings`.
pub const MAX_READINGS_LIMIT: usize = 5000;
/// Default number of alerts returned by `GET /alerts`.
pub const DEFAULT_ALERTS_LIMIT: usize = 20;
/// Largest accepted `limit` for `GET /alerts`.
pub const MAX_ALERTS_LIMIT: usize = 1000;

/// `?limit=&device_id=` for reading listings.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingsQuery {
    pub limit: Option<usize>,
    pub device_id: Option<String>,
}

/// `?device_id=` for the latest-reading lookup.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceQuery {
    pub device_id: Option<String>,
}

/// `?limit=` for alert listings.
#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

/// Resolve an optional `limit` against a default and an inclusive maximum.
pub fn resolve_limit(limit: Option<usize>, default: usize, max: usize) -> Result<usize, AppError> {
    match limit {
        None => Ok(default),
        Some(n) if (1..=max).contains(&n) => Ok(n),
        Some(n) => Err(AppError::BadRequest(format!(
            "limit must be between 1 and {max}, got {n}"
        ))),
    }
}

/// Treat a blank `device_id` parameter as absent.
pub fn device_filter(device_id: Option<&str>) -> Option<&str> {
    device_id.map(str::trim).filter(|id| !id.is_empty())
}
