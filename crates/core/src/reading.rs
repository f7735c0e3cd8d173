//! Sensor reading types and ingestion-boundary validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Device id used when the sensor does not send one.
pub const DEFAULT_DEVICE_ID: &str = "device1";

/// Maximum accepted length of a device identifier.
pub const MAX_DEVICE_ID_LEN: usize = 64;

/// A validated water quality sample.
///
/// Immutable once created. Produced by [`NewReading::into_reading`] at the
/// ingestion boundary, so every `Reading` in the system is within the
/// physical ranges checked there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the reading was ingested.
    pub timestamp: Timestamp,
    pub device_id: String,
    /// pH, 0-14.
    pub ph: f64,
    /// Turbidity in NTU.
    pub turbidity: f64,
    /// Total dissolved solids in ppm.
    pub tds: f64,
    /// Water temperature in Celsius, if the device has a probe.
    pub temperature: Option<f64>,
}

/// Inbound reading payload as posted by a device or the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    pub ph: f64,
    pub turbidity: f64,
    pub tds: f64,
    #[serde(default = "default_device_id")]
    pub device_id: String,
    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.to_string()
}

impl NewReading {
    /// Check the payload against the physical ranges of each sensor.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_range(self.ph, "ph", 0.0, 14.0)?;
        validate_non_negative(self.turbidity, "turbidity")?;
        validate_non_negative(self.tds, "tds")?;
        if let Some(temp) = self.temperature {
            if !temp.is_finite() {
                return Err(CoreError::Validation(
                    "temperature must be a finite number".to_string(),
                ));
            }
        }

        let device_id = self.device_id.trim();
        if device_id.is_empty() {
            return Err(CoreError::Validation("device_id is required".to_string()));
        }
        if device_id.chars().count() > MAX_DEVICE_ID_LEN {
            return Err(CoreError::Validation(format!(
                "device_id must be at most {MAX_DEVICE_ID_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Validate and stamp the payload, producing an immutable [`Reading`].
    pub fn into_reading(self, timestamp: Timestamp) -> Result<Reading, CoreError> {
        self.validate()?;
        Ok(Reading {
            timestamp,
            device_id: self.device_id.trim().to_string(),
            ph: self.ph,
            turbidity: self.turbidity,
            tds: self.tds,
            temperature: self.temperature,
        })
    }
}

fn validate_range(value: f64, name: &str, min: f64, max: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(min..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

fn validate_non_negative(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
