use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use aquawatch_core::quality::BreachTracker;
use aquawatch_db::{MemoryStore, PgStore, QualityStore};
use aquawatch_events::delivery::SmsDelivery;
use aquawatch_events::{Broadcaster, LogNotifier, Notifier};
use aquawatch_pipeline::IngestPipeline;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aquawatch_api::config::ServerConfig;
use aquawatch_api::router::build_app_router;
use aquawatch_api::state::AppState;
use aquawatch_api::{background, ws};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "aquawatch_api=debug,aquawatch_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let store = build_store(&config).await?;
    tracing::info!(storage = store.backend_name(), "Storage ready");

    // --- Notifier ---
    let notifier: Arc<dyn Notifier> = match config.sms.clone() {
        Some(sms) => {
            tracing::info!("SMS alerts enabled");
            Arc::new(SmsDelivery::new(sms)?)
        }
        None => {
            tracing::warn!("Twilio not configured, alerts will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // --- Tracker, broadcaster, pipeline ---
    let tracker = Arc::new(BreachTracker::new(
        config.monitor.safe_range,
        config.monitor.durations.clone(),
    ));
    tracing::info!(
        alert_duration_secs = config.monitor.durations.default.as_secs(),
        "Breach tracker created"
    );
    let broadcaster = Arc::new(Broadcaster::new(config.subscriber_buffer));
    let pipeline = IngestPipeline::new(store, tracker, Arc::clone(&broadcaster), notifier);

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(
        Arc::clone(&broadcaster),
        Duration::from_secs(config.ws_heartbeat_secs),
    );

    // --- Simulator ---
    let cancel = CancellationToken::new();
    let simulator_handle = if config.simulator.enabled {
        let task = background::simulator::run(
            pipeline.clone(),
            config.simulator.clone(),
            cancel.clone(),
        );
        Some(tokio::spawn(task))
    } else {
        None
    };

    // --- Router ---
    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    if let Some(handle) = simulator_handle {
        if tokio::time::timeout(drain_timeout, handle).await.is_err() {
            tracing::warn!("Simulator did not stop within the shutdown timeout");
        }
        tracing::info!("Simulator stopped");
    }

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    let subscribers = broadcaster.subscriber_count().await;
    tracing::info!(subscribers, "Closing remaining live subscribers");
    broadcaster.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Connect to Postgres when `DATABASE_URL` is set, otherwise fall back to the
/// bounded in-memory store.
async fn build_store(config: &ServerConfig) -> Result<Arc<dyn QualityStore>, Box<dyn std::error::Error>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory storage");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = aquawatch_db::create_pool(database_url).await?;
    tracing::info!("Database connection pool created");

    aquawatch_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    aquawatch_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgStore::new(pool)))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
