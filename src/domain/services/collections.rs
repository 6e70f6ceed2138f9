use std::sync::Arc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};
use crate::domain::ports::LocalStorage;
use crate::error::AppError;

pub const APPOINTMENTS_KEY: &str = "massageAppointments";
pub const USERS_KEY: &str = "massageUsers";
pub const SYNC_QUEUE_KEY: &str = "syncQueue";
pub const SESSION_KEY: &str = "currentSession";
pub const BLOCKED_DATES_KEY: &str = "massageBlockedDates";

/// Documents that must land in storage together.
#[derive(Default)]
pub struct Batch {
    entries: Vec<(&'static str, String)>,
}

impl Batch {
    pub fn put<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), AppError> {
        self.entries.push((key, serde_json::to_string(value)?));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed JSON documents on top of a raw `LocalStorage`.
#[derive(Clone)]
pub struct Collections {
    storage: Arc<dyn LocalStorage>,
}

impl Collections {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Loads a collection. Missing keys yield an empty collection; unparseable
    /// documents are moved aside to `<key>.corrupt` and reset to empty.
    pub async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => {
                debug!("Loaded {} item(s) from '{}'", items.len(), key);
                Ok(items)
            }
            Err(e) => {
                let corrupted = AppError::PersistenceCorrupted {
                    key: key.to_string(),
                    reason: e.to_string(),
                };
                warn!("{}. Starting with an empty collection.", corrupted);
                self.quarantine(key, &raw).await;
                Ok(Vec::new())
            }
        }
    }

    pub async fn save_batch(&self, batch: Batch) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.storage.set_many(&batch.entries).await?;
        debug!(
            "Saved {} document(s): {}",
            batch.entries.len(),
            batch.entries.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(", ")
        );
        Ok(())
    }

    pub async fn load_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(raw) = self.storage.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Discarding corrupted '{}': {}", key, e);
                self.quarantine(key, &raw).await;
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.storage.remove(key).await
    }

    async fn quarantine(&self, key: &str, raw: &str) {
        let backup_key = format!("{}.corrupt", key);
        if let Err(e) = self.storage.set(&backup_key, raw).await {
            error!("Failed to back up corrupted '{}': {:?}", key, e);
        }
        if let Err(e) = self.storage.remove(key).await {
            error!("Failed to reset corrupted '{}': {:?}", key, e);
        }
    }
}
