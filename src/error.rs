use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Slot unavailable: {date} at {time}")]
    SlotUnavailable { date: String, time: String },
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("Stored data under '{key}' is corrupted: {reason}")]
    PersistenceCorrupted { key: String, reason: String },
    #[error("Local storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn slot_unavailable(date: &str, time: &str) -> Self {
        AppError::SlotUnavailable {
            date: date.to_string(),
            time: time.to_string(),
        }
    }

    /// Whether a remote failure may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::RemoteUnavailable(_))
    }
}
