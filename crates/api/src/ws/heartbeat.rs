use std::sync::Arc;
use std::time::Duration;

use aquawatch_events::Broadcaster;

/// Spawn a background task that queues a Ping for every live subscriber at
/// a fixed interval. Subscribers whose queues are full or closed are pruned.
///
/// The returned `JoinHandle` is aborted during shutdown.
pub fn start_heartbeat(broadcaster: Arc<Broadcaster>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;
            let report = broadcaster.ping_all().await;
            tracing::debug!(
                delivered = report.delivered,
                dropped = report.dropped,
                "WebSocket heartbeat ping"
            );
        }
    })
}
