use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::models::appointment::{Appointment, AppointmentPatch};
use crate::domain::models::user::User;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Connectivity {
    #[default]
    Unknown,
    Online,
    Offline,
}

/// A write that still has to reach the remote service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "operationKind", content = "payload", rename_all = "camelCase")]
pub enum SyncOperation {
    CreateAppointment(Appointment),
    #[serde(rename_all = "camelCase")]
    UpdateAppointment { appointment_id: String, patch: AppointmentPatch },
    CreateUser(User),
}

impl SyncOperation {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncOperation::CreateAppointment(_) => "createAppointment",
            SyncOperation::UpdateAppointment { .. } => "updateAppointment",
            SyncOperation::CreateUser(_) => "createUser",
        }
    }

    /// Local id of the appointment this operation touches, if any.
    pub fn appointment_id(&self) -> Option<&str> {
        match self {
            SyncOperation::CreateAppointment(a) => Some(&a.id),
            SyncOperation::UpdateAppointment { appointment_id, .. } => Some(appointment_id),
            SyncOperation::CreateUser(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueItem {
    pub id: String,
    #[serde(flatten)]
    pub operation: SyncOperation,
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub next_attempt_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SyncQueueItem {
    pub fn new(operation: SyncOperation, retry_base: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            operation,
            attempts: 0,
            enqueued_at: now,
            next_attempt_at: after(now, Some(retry_base)),
            last_error: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_attempt_at <= now
    }

    /// Records a failed attempt and pushes the next one out by `base * 2^attempts`.
    pub fn record_failure(&mut self, error: String, retry_base: chrono::Duration, now: DateTime<Utc>) {
        self.attempts += 1;
        self.last_error = Some(error);
        let factor = 1i32 << self.attempts.min(16);
        self.next_attempt_at = after(now, retry_base.checked_mul(factor));
    }
}

/// `now + delay`, saturating at the latest representable instant.
fn after(now: DateTime<Utc>, delay: Option<chrono::Duration>) -> DateTime<Utc> {
    delay
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub connectivity: Connectivity,
    pub queue_size: usize,
    pub remote_configured: bool,
}

/// Outcome of one pass over the retry queue.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainReport {
    pub synced: usize,
    pub retried: usize,
    pub deferred: usize,
    pub dropped: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub users_pushed: usize,
    pub appointments_pushed: usize,
    pub appointments_adopted: usize,
}
