//! Repository for the `water_readings` table (append-only time-series).

use aquawatch_core::reading::Reading;
use sqlx::PgPool;

use crate::models::reading::ReadingRow;

/// Column list for `water_readings` SELECT queries (includes `id` and `created_at`).
const COLUMNS: &str = "\
    id, device_id, ph, turbidity, tds, temperature, recorded_at, created_at";

/// Column list for `water_readings` INSERT statements (excludes auto-generated `id` and `created_at`).
const INSERT_COLUMNS: &str = "device_id, ph, turbidity, tds, temperature, recorded_at";

/// Provides query operations for sensor readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Append a single reading.
    pub async fn insert(pool: &PgPool, reading: &Reading) -> Result<ReadingRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO water_readings ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReadingRow>(&query)
            .bind(&reading.device_id)
            .bind(reading.ph)
            .bind(reading.turbidity)
            .bind(reading.tds)
            .bind(reading.temperature)
            .bind(reading.timestamp)
            .fetch_one(pool)
            .await
    }

    /// Most recent readings, newest first, optionally for a single device.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
        device_id: Option<&str>,
    ) -> Result<Vec<ReadingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM water_readings \
             WHERE ($1::TEXT IS NULL OR device_id = $1) \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ReadingRow>(&query)
            .bind(device_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The newest reading, optionally for a single device.
    pub async fn latest(
        pool: &PgPool,
        device_id: Option<&str>,
    ) -> Result<Option<ReadingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM water_readings \
             WHERE ($1::TEXT IS NULL OR device_id = $1) \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, ReadingRow>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    /// Total number of stored readings.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM water_readings")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
