use std::env;
use std::path::PathBuf;
use std::time::Duration;
use crate::domain::models::schedule::WeeklySchedule;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub remote_api_url: Option<String>,
    pub remote_api_token: Option<String>,
    pub remote_health_url: Option<String>,
    pub notify_webhook_url: Option<String>,
    pub sync: SyncPolicy,
    pub schedule: WeeklySchedule,
    pub auto_confirm_bookings: bool,
    pub block_federal_holidays: bool,
    pub logging: LoggingConfig,
}

/// Where the JSON log file goes. `dir: None` keeps logging on stdout only.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub file_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: Some(PathBuf::from("./logs")),
            file_filter: "info,appointment_store=debug".to_string(),
        }
    }
}

/// Upper bound for `SYNC_RETRY_BASE_SECS`.
pub const MAX_RETRY_BASE: Duration = Duration::from_secs(24 * 60 * 60);

/// Timing knobs for connectivity probing and the retry queue.
#[derive(Clone, Debug)]
pub struct SyncPolicy {
    pub check_interval: Duration,
    pub health_timeout: Duration,
    pub retry_base: Duration,
    pub max_attempts: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            health_timeout: Duration::from_secs(3),
            retry_base: Duration::from_secs(5),
            max_attempts: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = SyncPolicy::default();
        let log_defaults = LoggingConfig::default();

        let schedule = match env::var("SCHEDULE_JSON") {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Validation(format!("SCHEDULE_JSON is not a valid schedule: {}", e)))?,
            Err(_) => WeeklySchedule::default(),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://appointments.db".to_string()),
            remote_api_url: non_empty_var("REMOTE_API_URL"),
            remote_api_token: non_empty_var("REMOTE_API_TOKEN"),
            remote_health_url: non_empty_var("REMOTE_HEALTH_URL"),
            notify_webhook_url: non_empty_var("NOTIFY_WEBHOOK_URL"),
            sync: SyncPolicy {
                check_interval: secs_var("SYNC_INTERVAL_SECS", defaults.check_interval)?,
                health_timeout: secs_var("HEALTH_TIMEOUT_SECS", defaults.health_timeout)?,
                retry_base: secs_var("SYNC_RETRY_BASE_SECS", defaults.retry_base)?.min(MAX_RETRY_BASE),
                max_attempts: match env::var("SYNC_MAX_ATTEMPTS") {
                    Ok(v) => v.parse().map_err(|_| AppError::Validation("SYNC_MAX_ATTEMPTS must be a number".into()))?,
                    Err(_) => defaults.max_attempts,
                },
            },
            schedule,
            auto_confirm_bookings: flag_var("AUTO_CONFIRM_BOOKINGS", false),
            block_federal_holidays: flag_var("BLOCK_FEDERAL_HOLIDAYS", true),
            logging: LoggingConfig {
                dir: match env::var("LOG_DIR") {
                    Ok(v) => log_dir(&v),
                    Err(_) => log_defaults.dir,
                },
                file_filter: non_empty_var("LOG_FILE_FILTER").unwrap_or(log_defaults.file_filter),
            },
        })
    }

    /// Health endpoint of the remote service; defaults to `/health` at the API host.
    pub fn health_url(&self) -> Option<String> {
        self.remote_health_url.clone().or_else(|| {
            self.remote_api_url.as_ref().map(|api| {
                let base = api.trim_end_matches('/');
                let host = base.strip_suffix("/api").unwrap_or(base);
                format!("{}/health", host)
            })
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Empty or `off` turns the file layer off.
fn log_dir(value: &str) -> Option<PathBuf> {
    match value.trim() {
        "" | "off" => None,
        dir => Some(PathBuf::from(dir)),
    }
}

fn flag_var(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => v == "true" || v == "1",
        Err(_) => default,
    }
}

fn secs_var(name: &str, default: Duration) -> Result<Duration, AppError> {
    match env::var(name) {
        Ok(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Validation(format!("{} must be a number of seconds", name))),
        Err(_) => Ok(default),
    }
}
