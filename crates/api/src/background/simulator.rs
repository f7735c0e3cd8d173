//! Synthetic water quality device.
//!
//! Produces readings that drift slowly through normal water quality ranges
//! and feeds them through the same [`IngestPipeline`] as real devices. In
//! alert mode every 20th reading jumps outside the safe range for one
//! parameter; the excursion persists and drifts from there, which is enough
//! to exercise the sustained-breach path end to end.

use std::time::Duration;

use aquawatch_core::reading::NewReading;
use aquawatch_pipeline::IngestPipeline;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::config::SimulatorConfig;

/// Every this many readings an alert-mode excursion is injected.
const EXCURSION_EVERY: u64 = 20;

const PH_NORMAL: (f64, f64) = (6.5, 8.0);
const TURBIDITY_NORMAL: (f64, f64) = (0.0, 50.0);
const TDS_NORMAL: (f64, f64) = (0.0, 300.0);
const TEMPERATURE_NORMAL: (f64, f64) = (18.0, 28.0);

/// Drifting sensor state for one synthetic device.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    device_id: String,
    alert_mode: bool,
    ph: f64,
    turbidity: f64,
    tds: f64,
    temperature: f64,
    count: u64,
}

impl SimulatedDevice {
    /// Start from a random point inside the normal ranges.
    pub fn new<R: Rng>(device_id: impl Into<String>, alert_mode: bool, rng: &mut R) -> Self {
        Self {
            device_id: device_id.into(),
            alert_mode,
            ph: rng.random_range(PH_NORMAL.0..=PH_NORMAL.1),
            turbidity: rng.random_range(TURBIDITY_NORMAL.0..=TURBIDITY_NORMAL.1),
            tds: rng.random_range(TDS_NORMAL.0..=TDS_NORMAL.1),
            temperature: rng.random_range(TEMPERATURE_NORMAL.0..=TEMPERATURE_NORMAL.1),
            count: 0,
        }
    }

    pub fn readings_generated(&self) -> u64 {
        self.count
    }

    /// Advance the device by one sample.
    pub fn next_reading<R: Rng>(&mut self, rng: &mut R) -> NewReading {
        self.count += 1;

        if self.alert_mode && self.count % EXCURSION_EVERY == 0 {
            match rng.random_range(0..4) {
                0 => self.ph = rng.random_range(4.0..=5.9),
                1 => self.ph = rng.random_range(9.1..=11.0),
                2 => self.turbidity = rng.random_range(100.1..=200.0),
                _ => self.tds = rng.random_range(500.1..=800.0),
            }
        } else {
            self.ph = (self.ph + rng.random_range(-0.1..=0.1)).clamp(0.0, 14.0);
            self.turbidity = (self.turbidity + rng.random_range(-2.0..=2.0)).max(0.0);
            self.tds = (self.tds + rng.random_range(-10.0..=10.0)).max(0.0);
            self.temperature = (self.temperature + rng.random_range(-0.5..=0.5)).clamp(10.0, 35.0);
        }

        // Sensor noise on top of the drifting state.
        NewReading {
            ph: round2((self.ph + rng.random_range(-0.05..=0.05)).clamp(0.0, 14.0)),
            turbidity: round2((self.turbidity + rng.random_range(-1.0..=1.0)).max(0.0)),
            tds: round2((self.tds + rng.random_range(-5.0..=5.0)).max(0.0)),
            device_id: self.device_id.clone(),
            temperature: Some(round2(self.temperature + rng.random_range(-0.2..=0.2))),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the simulator loop until `cancel` is triggered.
///
/// Ingest failures are logged and the loop carries on.
pub async fn run(pipeline: IngestPipeline, config: SimulatorConfig, cancel: CancellationToken) {
    let mut device = SimulatedDevice::new(config.device_id.clone(), config.alert_mode, &mut rand::rng());

    tracing::info!(
        device_id = %config.device_id,
        interval_secs = config.interval_secs,
        alert_mode = config.alert_mode,
        "Simulator started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(
                    readings = device.readings_generated(),
                    "Simulator stopping"
                );
                break;
            }
            _ = interval.tick() => {
                let reading = device.next_reading(&mut rand::rng());
                match pipeline.ingest(reading).await {
                    Ok(outcome) if outcome.alert_fired => {
                        tracing::info!(alert_count = outcome.alert_count, "Simulated reading raised alerts");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Simulated reading rejected");
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
