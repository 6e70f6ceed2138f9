pub mod background;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;

use crate::background::start_sync_worker;
use crate::config::{Config, LoggingConfig};
use crate::error::AppError;
use crate::infra::factory::bootstrap_store;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Pretty logs on stdout (`RUST_LOG`), plus a daily JSON file when a log
/// directory is configured. Hold the guard until shutdown to flush the file.
pub fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match &logging.dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "appointment-store.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(&logging.file_filter));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    match &logging.dir {
        Some(dir) => info!("Logging initialized. Writing JSON logs to {}", dir.display()),
        None => info!("Logging initialized (stdout only)"),
    }
    guard
}

/// Opens the store, keeps it in sync with the remote service and waits for ctrl-c.
pub async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let _guard = init_logging(&config.logging);

    let store = bootstrap_store(&config).await?;

    let status = store.sync_status().await;
    info!(
        "Appointment store ready ({} queued operation(s), remote configured: {})",
        status.queue_size, status.remote_configured
    );

    let worker_store = store.clone();
    let interval = config.sync.check_interval;
    tokio::spawn(async move {
        start_sync_worker(worker_store, interval).await;
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to listen for shutdown signal: {}", e)))?;

    info!("Shutting down");
    Ok(())
}
