//! The "a new reading arrived" orchestration.

use std::sync::Arc;

use aquawatch_core::quality::BreachTracker;
use aquawatch_core::reading::NewReading;
use aquawatch_core::types::Timestamp;
use aquawatch_db::QualityStore;
use aquawatch_events::{Broadcaster, LiveEvent, Notifier};
use chrono::Utc;
use serde::Serialize;

use crate::error::IngestError;

/// Result of a successful ingest, returned to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    pub alert_fired: bool,
    pub alert_count: usize,
}

/// Shared ingestion service. Cheap to clone.
#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn QualityStore>,
    tracker: Arc<BreachTracker>,
    broadcaster: Arc<Broadcaster>,
    notifier: Arc<dyn Notifier>,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn QualityStore>,
        tracker: Arc<BreachTracker>,
        broadcaster: Arc<Broadcaster>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            tracker,
            broadcaster,
            notifier,
        }
    }

    /// Ingest a reading stamped with the current wall-clock time.
    pub async fn ingest(&self, input: NewReading) -> Result<IngestOutcome, IngestError> {
        self.ingest_at(input, Utc::now()).await
    }

    /// Ingest a reading observed at `now`.
    ///
    /// Steps, in order: validate, persist the reading, run the breach
    /// tracker, then for each alert persist it, dispatch the notification
    /// and broadcast it. The reading itself is broadcast last.
    ///
    /// If an alert cannot be stored, it and every later alert of the call
    /// are re-armed in the tracker, so a failed call leaves no alert marked
    /// as sent.
    pub async fn ingest_at(
        &self,
        input: NewReading,
        now: Timestamp,
    ) -> Result<IngestOutcome, IngestError> {
        let reading = input.into_reading(now)?;

        if let Err(e) = self.store.append_reading(&reading).await {
            tracing::error!(device_id = %reading.device_id, error = %e, "Failed to store reading");
            return Err(e.into());
        }

        let alerts = self.tracker.check_and_alert(&reading.device_id, &reading, now);

        for (i, alert) in alerts.iter().enumerate() {
            if let Err(e) = self.store.append_alert(alert).await {
                tracing::error!(
                    device_id = %alert.device_id,
                    parameter = %alert.parameter,
                    error = %e,
                    "Failed to store alert"
                );
                // Undelivered alerts stay due so the next breaching sample retries them.
                for pending in &alerts[i..] {
                    self.tracker.rearm(&pending.device_id, pending.parameter);
                }
                return Err(e.into());
            }
            tracing::info!(
                device_id = %alert.device_id,
                parameter = %alert.parameter,
                message = %alert.message,
                "Water quality alert raised"
            );

            self.dispatch_notification(alert.message.clone());
            self.broadcaster.broadcast(&LiveEvent::Alert(alert.clone())).await;
        }

        let alert_count = alerts.len();
        self.broadcaster.broadcast(&LiveEvent::Reading(reading)).await;

        Ok(IngestOutcome {
            alert_fired: alert_count > 0,
            alert_count,
        })
    }

    /// Clear breach tracking for a device. Returns `true` if it had state.
    pub fn reset_device(&self, device_id: &str) -> bool {
        self.tracker.reset_device(device_id)
    }

    pub fn store(&self) -> &Arc<dyn QualityStore> {
        &self.store
    }

    pub fn tracker(&self) -> &Arc<BreachTracker> {
        &self.tracker
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Send the alert message on a detached task so a slow gateway never
    /// holds up ingestion.
    fn dispatch_notification(&self, message: String) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if !notifier.notify(&message).await {
                tracing::debug!(channel = notifier.channel(), "Alert notification not delivered");
            }
        });
    }
}
