use aquawatch_core::reading::Reading;
use aquawatch_core::types::Timestamp;
use sqlx::FromRow;

/// A row of `water_readings`.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingRow {
    pub id: i64,
    pub device_id: String,
    pub ph: f64,
    pub turbidity: f64,
    pub tds: f64,
    pub temperature: Option<f64>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        Reading {
            timestamp: row.recorded_at,
            device_id: row.device_id,
            ph: row.ph,
            turbidity: row.turbidity,
            tds: row.tds,
            temperature: row.temperature,
        }
    }
}
