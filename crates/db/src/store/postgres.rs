//! Postgres-backed [`QualityStore`].

use aquawatch_core::alert::Alert;
use aquawatch_core::reading::Reading;
use async_trait::async_trait;

use crate::error::StoreError;
use crate::repositories::{AlertRepo, ReadingRepo};
use crate::store::{QualityStore, StoreStats};
use crate::DbPool;

/// Store that writes through the repositories to Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn to_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl QualityStore for PgStore {
    async fn append_reading(&self, reading: &Reading) -> Result<(), StoreError> {
        ReadingRepo::insert(&self.pool, reading).await?;
        Ok(())
    }

    async fn append_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        AlertRepo::insert(&self.pool, alert).await?;
        Ok(())
    }

    async fn recent_readings(
        &self,
        limit: usize,
        device_id: Option<&str>,
    ) -> Result<Vec<Reading>, StoreError> {
        let rows = ReadingRepo::list_recent(&self.pool, to_limit(limit), device_id).await?;
        Ok(rows.into_iter().map(Reading::from).collect())
    }

    async fn latest_reading(&self, device_id: Option<&str>) -> Result<Option<Reading>, StoreError> {
        let row = ReadingRepo::latest(&self.pool, device_id).await?;
        Ok(row.map(Reading::from))
    }

    async fn recent_alerts(&self, limit: usize) -> Result<Vec<Alert>, StoreError> {
        AlertRepo::list_recent(&self.pool, to_limit(limit))
            .await?
            .into_iter()
            .map(Alert::try_from)
            .collect()
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let readings_count = ReadingRepo::count(&self.pool).await?;
        let alerts_count = AlertRepo::count(&self.pool).await?;
        let latest = ReadingRepo::latest(&self.pool, None).await?;

        Ok(StoreStats {
            readings_count: readings_count.max(0) as u64,
            alerts_count: alerts_count.max(0) as u64,
            latest_timestamp: latest.as_ref().map(|r| r.recorded_at),
            device_id: latest.map(|r| r.device_id),
        })
    }

    async fn health_check(&self) -> bool {
        match crate::health_check(&self.pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
