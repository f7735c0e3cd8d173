//! Bounded in-process [`QualityStore`].
//!
//! Used when no `DATABASE_URL` is configured. Keeps the most recent
//! readings and alerts in ring buffers; the oldest entry is evicted once a
//! buffer is full. Counters in [`StoreStats`] reflect what is retained.

use std::collections::VecDeque;

use aquawatch_core::alert::Alert;
use aquawatch_core::reading::Reading;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::{QualityStore, StoreStats};

/// Default number of readings retained.
pub const DEFAULT_READING_CAPACITY: usize = 500;

/// Default number of alerts retained.
pub const DEFAULT_ALERT_CAPACITY: usize = 100;

pub struct MemoryStore {
    readings: RwLock<VecDeque<Reading>>,
    alerts: RwLock<VecDeque<Alert>>,
    reading_capacity: usize,
    alert_capacity: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_READING_CAPACITY, DEFAULT_ALERT_CAPACITY)
    }

    /// A store retaining at most the given number of readings and alerts.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(reading_capacity: usize, alert_capacity: usize) -> Self {
        let reading_capacity = reading_capacity.max(1);
        let alert_capacity = alert_capacity.max(1);
        Self {
            readings: RwLock::new(VecDeque::with_capacity(reading_capacity)),
            alerts: RwLock::new(VecDeque::with_capacity(alert_capacity)),
            reading_capacity,
            alert_capacity,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, capacity: usize) {
    if buffer.len() >= capacity {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

fn matches_device(reading: &Reading, device_id: Option<&str>) -> bool {
    device_id.map_or(true, |id| reading.device_id == id)
}

#[async_trait]
impl QualityStore for MemoryStore {
    async fn append_reading(&self, reading: &Reading) -> Result<(), StoreError> {
        push_bounded(&mut self.readings.write(), reading.clone(), self.reading_capacity);
        Ok(())
    }

    async fn append_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        push_bounded(&mut self.alerts.write(), alert.clone(), self.alert_capacity);
        Ok(())
    }

    async fn recent_readings(
        &self,
        limit: usize,
        device_id: Option<&str>,
    ) -> Result<Vec<Reading>, StoreError> {
        let readings = self.readings.read();
        Ok(readings
            .iter()
            .rev()
            .filter(|r| matches_device(r, device_id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn latest_reading(&self, device_id: Option<&str>) -> Result<Option<Reading>, StoreError> {
        let readings = self.readings.read();
        Ok(readings
            .iter()
            .rev()
            .find(|r| matches_device(r, device_id))
            .cloned())
    }

    async fn recent_alerts(&self, limit: usize) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.read();
        Ok(alerts.iter().rev().take(limit).cloned().collect())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let readings = self.readings.read();
        let alerts_count = self.alerts.read().len() as u64;
        let latest = readings.back();

        Ok(StoreStats {
            readings_count: readings.len() as u64,
            alerts_count,
            latest_timestamp: latest.map(|r| r.timestamp),
            device_id: latest.map(|r| r.device_id.clone()),
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
