use crate::domain::models::{
    appointment::{Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch},
    notification::NotificationEvent,
    user::{User, UserProfile},
};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable key/value storage holding one JSON document per key.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    /// Writes every entry or none of them.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Authenticated user returned by the remote auth endpoints.
#[derive(Debug, Clone)]
pub struct RemoteAuth {
    pub user: UserProfile,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    /// Plaintext when registering interactively.
    pub password: Option<&'a str>,
    /// Opaque credential when replaying an offline registration.
    pub password_hash: Option<&'a str>,
}

impl<'a> Registration<'a> {
    pub fn replay(user: &'a User) -> Self {
        Self {
            name: &user.name,
            email: &user.email,
            phone: &user.phone,
            password: None,
            password_hash: Some(&user.password_hash),
        }
    }
}

/// The booking backend. Transport failures must surface as `AppError::RemoteUnavailable`.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn health(&self) -> Result<bool, AppError>;
    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError>;
    async fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment, AppError>;
    async fn update_appointment(&self, remote_id: &str, patch: &AppointmentPatch) -> Result<Appointment, AppError>;
    async fn login(&self, email: &str, password: &str) -> Result<RemoteAuth, AppError>;
    async fn register(&self, registration: &Registration<'_>) -> Result<RemoteAuth, AppError>;
    async fn list_users(&self) -> Result<Vec<UserProfile>, AppError>;
}

pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AppError>;
    fn verify(&self, plaintext: &str, stored: &str) -> bool;
}

/// Fire-and-forget delivery of booking events; must never block the caller.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, event: NotificationEvent);
}
