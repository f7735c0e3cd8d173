//! Repository for the `water_alerts` table.

use aquawatch_core::alert::Alert;
use sqlx::PgPool;

use crate::models::alert::AlertRow;

/// Column list for `water_alerts` SELECT queries.
const COLUMNS: &str = "\
    id, device_id, parameter, message, \
    ph, turbidity, tds, temperature, \
    reading_at, raised_at, created_at";

/// Column list for `water_alerts` INSERT statements.
const INSERT_COLUMNS: &str = "\
    device_id, parameter, message, \
    ph, turbidity, tds, temperature, \
    reading_at, raised_at";

/// Provides query operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Append an alert together with its reading snapshot.
    pub async fn insert(pool: &PgPool, alert: &Alert) -> Result<AlertRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO water_alerts ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRow>(&query)
            .bind(&alert.device_id)
            .bind(alert.parameter.as_str())
            .bind(&alert.message)
            .bind(alert.readings.ph)
            .bind(alert.readings.turbidity)
            .bind(alert.readings.tds)
            .bind(alert.readings.temperature)
            .bind(alert.readings.timestamp)
            .bind(alert.timestamp)
            .fetch_one(pool)
            .await
    }

    /// Most recent alerts, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<AlertRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM water_alerts \
             ORDER BY raised_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, AlertRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Total number of stored alerts.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM water_alerts")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
