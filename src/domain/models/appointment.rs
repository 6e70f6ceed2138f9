use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Active appointments hold their slot.
    pub fn is_active(self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: Option<String>,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub price: u32,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new booking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub user_id: Option<String>,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub price: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the field untouched. Price is fixed at booking.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl AppointmentPatch {
    pub fn reschedule(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            time: Some(time.into()),
            ..Default::default()
        }
    }

    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Conjunctive filter; unset fields match everything.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl AppointmentFilter {
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Default::default()
        }
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.user_id.as_ref().is_none_or(|u| appointment.user_id.as_ref() == Some(u))
            && self.status.is_none_or(|s| appointment.status == s)
            && self.date.as_ref().is_none_or(|d| &appointment.date == d)
    }
}

impl Appointment {
    pub fn new(draft: AppointmentDraft, default_status: AppointmentStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: draft.user_id,
            client_name: draft.client_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            service: draft.service.trim().to_string(),
            date: draft.date.trim().to_string(),
            time: draft.time.trim().to_string(),
            price: draft.price,
            status: draft.status.unwrap_or(default_status),
            payment_status: draft.payment_status.unwrap_or_default(),
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
            cancellation_reason: None,
            cancelled_at: None,
            remote_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Natural key used to match a local record against the remote mirror.
    pub fn natural_key(&self) -> (&str, &str, Option<&str>) {
        (&self.date, &self.time, self.user_id.as_deref())
    }

    /// Applies every set field of `patch` and bumps `updated_at`.
    pub fn apply(&mut self, patch: &AppointmentPatch) {
        if let Some(user_id) = &patch.user_id {
            self.user_id = Some(user_id.clone());
        }
        if let Some(name) = &patch.client_name {
            self.client_name = name.trim().to_string();
        }
        if let Some(email) = &patch.email {
            self.email = email.trim().to_string();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(service) = &patch.service {
            self.service = service.trim().to_string();
        }
        if let Some(date) = &patch.date {
            self.date = date.trim().to_string();
        }
        if let Some(time) = &patch.time {
            self.time = time.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status;
            if status == AppointmentStatus::Cancelled && self.cancelled_at.is_none() {
                self.cancelled_at = Some(Utc::now());
            }
        }
        if let Some(payment_status) = patch.payment_status {
            self.payment_status = payment_status;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(reason) = &patch.cancellation_reason {
            self.cancellation_reason = Some(reason.clone());
        }
        self.updated_at = Utc::now();
    }

    /// Payload for creating this record on the remote service.
    pub fn to_draft(&self) -> AppointmentDraft {
        AppointmentDraft {
            user_id: self.user_id.clone(),
            client_name: self.client_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            service: self.service.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            price: self.price,
            status: Some(self.status),
            payment_status: Some(self.payment_status),
            notes: self.notes.clone(),
        }
    }

    /// Overwrites the business fields with the remote copy, keeping the local id.
    pub fn adopt_remote(&mut self, remote: &Appointment) {
        let local_id = std::mem::take(&mut self.id);
        *self = remote.clone();
        self.remote_id = Some(remote.id.clone());
        self.id = local_id;
    }
}
