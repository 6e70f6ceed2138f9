use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::models::appointment::AppointmentStatus;
use crate::domain::ports::{LocalStorage, NotificationDispatcher, RemoteService};
use crate::domain::services::store::{AppointmentStore, StoreOptions};
use crate::error::AppError;
use crate::infra::auth::Argon2Verifier;
use crate::infra::notify::{HttpNotifier, LogNotifier};
use crate::infra::remote::HttpRemoteService;
use crate::infra::storage::{MemoryLocalStorage, SqliteLocalStorage};

pub async fn bootstrap_store(config: &Config) -> Result<Arc<AppointmentStore>, AppError> {
    let storage = connect_local_storage(&config.database_url).await?;

    let remote: Option<Arc<dyn RemoteService>> = match (&config.remote_api_url, config.health_url()) {
        (Some(api_url), Some(health_url)) => {
            info!("Remote service configured at {}", api_url);
            Some(Arc::new(HttpRemoteService::new(
                api_url.clone(),
                health_url,
                config.remote_api_token.clone(),
            )?))
        }
        _ => {
            info!("No remote service configured, running fully local");
            None
        }
    };

    let notifier: Arc<dyn NotificationDispatcher> = match &config.notify_webhook_url {
        Some(url) => Arc::new(HttpNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    };

    let default_status = if config.auto_confirm_bookings {
        AppointmentStatus::Confirmed
    } else {
        AppointmentStatus::Pending
    };

    let store = AppointmentStore::open(StoreOptions {
        storage,
        remote,
        verifier: Arc::new(Argon2Verifier::new()),
        notifier,
        schedule: config.schedule.clone(),
        policy: config.sync.clone(),
        default_status,
        auto_block_holidays: config.block_federal_holidays,
    })
    .await?;

    Ok(Arc::new(store))
}

/// `memory` selects volatile storage; anything else is a SQLite URL.
pub async fn connect_local_storage(database_url: &str) -> Result<Arc<dyn LocalStorage>, AppError> {
    if database_url == "memory" {
        info!("Using in-memory local storage; data will not survive a restart");
        return Ok(Arc::new(MemoryLocalStorage::new()));
    }

    let pool = connect_sqlite_pool(database_url).await?;
    Ok(Arc::new(SqliteLocalStorage::new(pool)))
}

/// WAL-mode pool with the `local_storage` schema migrated.
pub async fn connect_sqlite_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    run_sqlite_migrations(&pool).await?;
    Ok(pool)
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run SQLite migrations: {}", e)))
}
