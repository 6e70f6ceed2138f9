#![allow(dead_code)]

use appointment_store::{
    config::SyncPolicy,
    domain::models::{
        appointment::{Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch, AppointmentStatus},
        notification::{NotificationEvent, NotificationKind},
        schedule::WeeklySchedule,
        user::{normalize_email, NewUser, UserProfile},
    },
    domain::ports::{CredentialVerifier, NotificationDispatcher, Registration, RemoteAuth, RemoteService},
    domain::services::store::{AppointmentStore, StoreOptions},
    error::AppError,
    infra::storage::MemoryLocalStorage,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Stand-in for the booking backend, with switchable reachability.
#[derive(Default)]
pub struct MockRemoteService {
    reachable: AtomicBool,
    /// Writes fail with a transient error while set, even if health is fine.
    failing_writes: AtomicBool,
    /// Only PATCH requests fail while set.
    failing_updates: AtomicBool,
    next_id: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub appointments: Mutex<Vec<Appointment>>,
    pub users: Mutex<Vec<(UserProfile, String)>>,
}

impl MockRemoteService {
    pub fn new(reachable: bool) -> Self {
        let remote = Self::default();
        remote.set_reachable(reachable);
        remote
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_updates(&self, failing: bool) {
        self.failing_updates.store(failing, Ordering::SeqCst);
    }

    /// Changes a password on the remote side only.
    pub fn set_password(&self, email: &str, password: &str) {
        let mut users = self.users.lock().unwrap();
        if let Some((_, stored)) = users.iter_mut().find(|(u, _)| u.email == normalize_email(email)) {
            *stored = password.to_string();
        }
    }

    pub fn appointment_count(&self) -> usize {
        self.appointments.lock().unwrap().len()
    }

    pub fn has_appointment_at(&self, date: &str, time: &str) -> bool {
        self.appointments
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.date == date && a.time == time && a.is_active())
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.users.lock().unwrap().iter().any(|(u, _)| u.email == normalize_email(email))
    }

    /// Seeds a record directly on the remote side.
    pub fn insert_appointment(&self, draft: AppointmentDraft) -> Appointment {
        let mut apt = Appointment::new(draft, AppointmentStatus::Pending);
        apt.id = self.fresh_id();
        self.appointments.lock().unwrap().push(apt.clone());
        apt
    }

    pub fn insert_user(&self, name: &str, email: &str, password: &str) -> UserProfile {
        let profile = UserProfile {
            id: self.fresh_id(),
            name: name.to_string(),
            email: normalize_email(email),
            phone: "555-0199".to_string(),
            role: Default::default(),
            total_appointments: 0,
            last_visit: None,
        };
        self.users.lock().unwrap().push((profile.clone(), password.to_string()));
        profile
    }

    fn fresh_id(&self) -> String {
        format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn check_reachable(&self) -> Result<(), AppError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::RemoteUnavailable("connection refused".into()))
        }
    }

    fn check_writable(&self) -> Result<(), AppError> {
        self.check_reachable()?;
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(AppError::RemoteUnavailable("503 Service Unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteService for MockRemoteService {
    async fn health(&self) -> Result<bool, AppError> {
        self.check_reachable()?;
        Ok(true)
    }

    async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        self.check_reachable()?;
        Ok(self.appointments.lock().unwrap().iter().filter(|a| filter.matches(a)).cloned().collect())
    }

    async fn create_appointment(&self, draft: &AppointmentDraft) -> Result<Appointment, AppError> {
        self.check_writable()?;
        let mut list = self.appointments.lock().unwrap();
        if list.iter().any(|a| a.is_active() && a.date == draft.date && a.time == draft.time) {
            return Err(AppError::slot_unavailable(&draft.date, &draft.time));
        }
        let mut apt = Appointment::new(draft.clone(), AppointmentStatus::Pending);
        apt.id = self.fresh_id();
        list.push(apt.clone());
        Ok(apt)
    }

    async fn update_appointment(&self, remote_id: &str, patch: &AppointmentPatch) -> Result<Appointment, AppError> {
        self.check_writable()?;
        if self.failing_updates.load(Ordering::SeqCst) {
            return Err(AppError::RemoteUnavailable("503 Service Unavailable".into()));
        }
        let mut list = self.appointments.lock().unwrap();
        let apt = list
            .iter_mut()
            .find(|a| a.id == remote_id)
            .ok_or_else(|| AppError::NotFound(remote_id.to_string()))?;
        apt.apply(patch);
        Ok(apt.clone())
    }

    async fn login(&self, email: &str, password: &str) -> Result<RemoteAuth, AppError> {
        self.check_reachable()?;
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|(u, p)| u.email == normalize_email(email) && p == password)
            .map(|(u, _)| RemoteAuth { user: u.clone(), token: Some(format!("token-{}", u.id)) })
            .ok_or(AppError::Unauthorized)
    }

    async fn register(&self, registration: &Registration<'_>) -> Result<RemoteAuth, AppError> {
        self.check_writable()?;
        if self.has_user(registration.email) {
            return Err(AppError::DuplicateEmail(registration.email.to_string()));
        }
        let secret = registration.password.or(registration.password_hash).unwrap_or_default();
        let profile = self.insert_user(registration.name, registration.email, secret);
        Ok(RemoteAuth { user: profile, token: None })
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, AppError> {
        self.check_reachable()?;
        Ok(self.users.lock().unwrap().iter().map(|(u, _)| u.clone()).collect())
    }
}

/// Cheap reversible "hash" so tests don't pay for argon2.
pub struct FakeVerifier;

impl CredentialVerifier for FakeVerifier {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        Ok(format!("fake${}", plaintext.chars().rev().collect::<String>()))
    }

    fn verify(&self, plaintext: &str, stored: &str) -> bool {
        self.hash(plaintext).is_ok_and(|h| h == stored)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingNotifier {
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.events.lock().unwrap().iter().map(|e| e.event_kind).collect()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn dispatch(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// The same labels on every day of the week.
pub fn every_day(labels: &[&str]) -> WeeklySchedule {
    (0..7).fold(WeeklySchedule::empty(), |schedule, day| schedule.with_day(day, labels.iter().copied()))
}

pub fn test_policy() -> SyncPolicy {
    SyncPolicy {
        check_interval: Duration::from_millis(50),
        health_timeout: Duration::from_millis(200),
        retry_base: Duration::ZERO,
        max_attempts: 3,
    }
}

/// Monday 10 AM / 11 AM only, everything else closed.
pub fn two_slot_monday() -> WeeklySchedule {
    WeeklySchedule::empty().with_day(1, ["10:00 AM", "11:00 AM"])
}

pub struct TestStore {
    pub store: AppointmentStore,
    pub storage: Arc<MemoryLocalStorage>,
    pub remote: Option<Arc<MockRemoteService>>,
    pub notifier: Arc<RecordingNotifier>,
    pub schedule: WeeklySchedule,
    pub policy: SyncPolicy,
}

impl TestStore {
    pub async fn local_only(schedule: WeeklySchedule) -> Self {
        Self::build(Arc::new(MemoryLocalStorage::new()), None, schedule, test_policy()).await
    }

    pub async fn with_remote(schedule: WeeklySchedule, reachable: bool) -> Self {
        let remote = Arc::new(MockRemoteService::new(reachable));
        Self::build(Arc::new(MemoryLocalStorage::new()), Some(remote), schedule, test_policy()).await
    }

    pub async fn build(
        storage: Arc<MemoryLocalStorage>,
        remote: Option<Arc<MockRemoteService>>,
        schedule: WeeklySchedule,
        policy: SyncPolicy,
    ) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let store = open_store(storage.clone(), remote.clone(), notifier.clone(), schedule.clone(), policy.clone()).await;
        Self { store, storage, remote, notifier, schedule, policy }
    }

    pub fn remote(&self) -> &MockRemoteService {
        self.remote.as_deref().expect("store was built without a remote")
    }

    /// A fresh store instance over the same storage and remote.
    pub async fn reopen(&self) -> AppointmentStore {
        open_store(
            self.storage.clone(),
            self.remote.clone(),
            Arc::new(RecordingNotifier::default()),
            self.schedule.clone(),
            self.policy.clone(),
        )
        .await
    }
}

async fn open_store(
    storage: Arc<MemoryLocalStorage>,
    remote: Option<Arc<MockRemoteService>>,
    notifier: Arc<RecordingNotifier>,
    schedule: WeeklySchedule,
    policy: SyncPolicy,
) -> AppointmentStore {
    AppointmentStore::open(StoreOptions {
        storage,
        remote: remote.map(|r| r as Arc<dyn RemoteService>),
        verifier: Arc::new(FakeVerifier),
        notifier,
        schedule,
        policy,
        default_status: AppointmentStatus::Pending,
        auto_block_holidays: false,
    })
    .await
    .expect("Failed to open store")
}

pub fn booking(date: &str, time: &str) -> AppointmentDraft {
    AppointmentDraft {
        user_id: None,
        client_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "555-0100".to_string(),
        service: "Swedish Massage".to_string(),
        date: date.to_string(),
        time: time.to_string(),
        price: 90,
        ..Default::default()
    }
}

pub fn booking_for(user_id: &str, date: &str, time: &str) -> AppointmentDraft {
    AppointmentDraft {
        user_id: Some(user_id.to_string()),
        ..booking(date, time)
    }
}

pub fn new_user(name: &str, email: &str, password: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        phone: "555-0123".to_string(),
        password: password.to_string(),
        ..Default::default()
    }
}
