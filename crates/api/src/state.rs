use std::sync::Arc;

use aquawatch_db::QualityStore;
use aquawatch_events::Broadcaster;
use aquawatch_pipeline::IngestPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every service lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Ingestion orchestration (owns the tracker, store, broadcaster, notifier).
    pub pipeline: IngestPipeline,
}

impl AppState {
    pub fn store(&self) -> &Arc<dyn QualityStore> {
        self.pipeline.store()
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        self.pipeline.broadcaster()
    }
}
