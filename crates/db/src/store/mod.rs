//! The [`QualityStore`] trait and its backends.

pub mod memory;
pub mod postgres;

use aquawatch_core::alert::Alert;
use aquawatch_core::reading::Reading;
use aquawatch_core::types::Timestamp;
use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreError;

/// Aggregate counters reported by `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub readings_count: u64,
    pub alerts_count: u64,
    /// Timestamp of the newest reading, if any.
    pub latest_timestamp: Option<Timestamp>,
    /// Device that produced the newest reading, if any.
    pub device_id: Option<String>,
}

/// Append-only persistence for readings and alerts.
///
/// Appends are awaited by the ingestion pipeline and any error fails the
/// ingest call. Read methods return newest first.
#[async_trait]
pub trait QualityStore: Send + Sync {
    async fn append_reading(&self, reading: &Reading) -> Result<(), StoreError>;

    async fn append_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// Up to `limit` readings, optionally restricted to one device.
    async fn recent_readings(
        &self,
        limit: usize,
        device_id: Option<&str>,
    ) -> Result<Vec<Reading>, StoreError>;

    async fn latest_reading(&self, device_id: Option<&str>) -> Result<Option<Reading>, StoreError>;

    async fn recent_alerts(&self, limit: usize) -> Result<Vec<Alert>, StoreError>;

    async fn stats(&self) -> Result<StoreStats, StoreError>;

    /// `true` when the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend name for the health endpoint.
    fn backend_name(&self) -> &'static str;
}
