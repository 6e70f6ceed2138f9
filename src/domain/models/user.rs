use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub total_appointments: u32,
    #[serde(default)]
    pub last_visit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User view without credential material.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub total_appointments: u32,
    #[serde(default)]
    pub last_visit: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Emails compare case-insensitively for uniqueness and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    pub fn new(draft: &NewUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            email: normalize_email(&draft.email),
            phone: draft.phone.trim().to_string(),
            role: draft.role,
            total_appointments: 0,
            last_visit: None,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Local record for a user known only through the remote service.
    pub fn from_profile(profile: &UserProfile, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            email: normalize_email(&profile.email),
            phone: profile.phone.clone(),
            role: profile.role,
            total_appointments: profile.total_appointments,
            last_visit: profile.last_visit,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            total_appointments: self.total_appointments,
            last_visit: self.last_visit,
        }
    }

    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(email) = &patch.email {
            self.email = normalize_email(email);
        }
        self.updated_at = Utc::now();
    }

    pub fn record_booking(&mut self) {
        let now = Utc::now();
        self.total_appointments += 1;
        self.last_visit = Some(now);
        self.updated_at = now;
    }
}
