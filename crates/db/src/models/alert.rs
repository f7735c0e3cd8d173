use aquawatch_core::alert::Alert;
use aquawatch_core::quality::Parameter;
use aquawatch_core::reading::Reading;
use aquawatch_core::types::Timestamp;
use sqlx::FromRow;

use crate::error::StoreError;

/// A row of `water_alerts`. The reading snapshot is flattened into columns.
#[derive(Debug, Clone, FromRow)]
pub struct AlertRow {
    pub id: i64,
    pub device_id: String,
    pub parameter: String,
    pub message: String,
    pub ph: f64,
    pub turbidity: f64,
    pub tds: f64,
    pub temperature: Option<f64>,
    pub reading_at: Timestamp,
    pub raised_at: Timestamp,
    pub created_at: Timestamp,
}

impl TryFrom<AlertRow> for Alert {
    type Error = StoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let parameter: Parameter = row.parameter.parse().map_err(|_| {
            StoreError::InvalidRow(format!(
                "alert {} has unknown parameter {:?}",
                row.id, row.parameter
            ))
        })?;

        Ok(Alert {
            timestamp: row.raised_at,
            device_id: row.device_id.clone(),
            parameter,
            message: row.message,
            readings: Reading {
                timestamp: row.reading_at,
                device_id: row.device_id,
                ph: row.ph,
                turbidity: row.turbidity,
                tds: row.tds,
                temperature: row.temperature,
            },
        })
    }
}
