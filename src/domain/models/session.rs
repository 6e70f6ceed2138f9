use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use crate::domain::models::user::UserProfile;

pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserProfile,
    /// Opaque marker issued by the remote service; absent for local logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: UserProfile, token: Option<String>) -> Self {
        let issued_at = Utc::now();
        Self {
            user,
            token,
            issued_at,
            expires_at: issued_at + Duration::days(SESSION_TTL_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_remote(&self) -> bool {
        self.token.is_some()
    }
}
