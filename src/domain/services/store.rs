use std::sync::Arc;
use chrono::{Datelike, Local, NaiveDate, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use crate::config::SyncPolicy;
use crate::domain::models::{
    appointment::{Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch, AppointmentStatus},
    blocked_date::{extend_holidays, BlockKind, BlockedDate},
    notification::{NotificationEvent, NotificationKind},
    schedule::WeeklySchedule,
    session::Session,
    sync::{Connectivity, SyncOperation, SyncQueueItem},
    user::{normalize_email, NewUser, User, UserPatch, UserProfile},
};
use crate::domain::ports::{CredentialVerifier, LocalStorage, NotificationDispatcher, Registration, RemoteService};
use crate::domain::services::availability::{available_slots_for, blocked_entry, is_fully_booked, is_offered, is_slot_free};
use crate::domain::services::collections::{
    Batch, Collections, APPOINTMENTS_KEY, BLOCKED_DATES_KEY, SESSION_KEY, SYNC_QUEUE_KEY, USERS_KEY,
};
use crate::error::AppError;

pub struct StoreOptions {
    pub storage: Arc<dyn LocalStorage>,
    pub remote: Option<Arc<dyn RemoteService>>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub notifier: Arc<dyn NotificationDispatcher>,
    pub schedule: WeeklySchedule,
    pub policy: SyncPolicy,
    pub default_status: AppointmentStatus,
    /// Adds generated federal holidays for this year and the next two.
    pub auto_block_holidays: bool,
}

/// How many years past the current one get generated holidays.
const HOLIDAY_YEARS_AHEAD: i32 = 2;

#[derive(Clone, Default)]
pub(crate) struct StoreState {
    pub(crate) appointments: Vec<Appointment>,
    pub(crate) users: Vec<User>,
    pub(crate) queue: Vec<SyncQueueItem>,
    pub(crate) blocked: Vec<BlockedDate>,
    pub(crate) session: Option<Session>,
}

impl StoreState {
    pub(crate) fn appointment_index(&self, id: &str) -> Option<usize> {
        self.appointments
            .iter()
            .position(|a| a.id == id || a.remote_id.as_deref() == Some(id))
    }

    pub(crate) fn has_pending_ops_for(&self, appointment_id: &str) -> bool {
        self.queue
            .iter()
            .any(|item| item.operation.appointment_id() == Some(appointment_id))
    }
}

/// Which documents an operation touched and must write back, in one batch.
#[derive(Clone, Copy, Default)]
pub(crate) struct Touched {
    pub(crate) appointments: bool,
    pub(crate) users: bool,
    pub(crate) queue: bool,
    pub(crate) blocked: bool,
    pub(crate) session: bool,
}

/// Where a write ended up.
enum RemoteWrite<T> {
    Mirrored(T),
    Queued,
    LocalOnly,
}

/// Owner of appointments and users. Local storage is written before any
/// mutating call returns; the remote service is used when reachable.
pub struct AppointmentStore {
    pub(crate) state: Mutex<StoreState>,
    pub(crate) collections: Collections,
    pub(crate) remote: Option<Arc<dyn RemoteService>>,
    pub(crate) verifier: Arc<dyn CredentialVerifier>,
    pub(crate) notifier: Arc<dyn NotificationDispatcher>,
    pub(crate) schedule: WeeklySchedule,
    pub(crate) policy: SyncPolicy,
    pub(crate) default_status: AppointmentStatus,
    pub(crate) connectivity: watch::Sender<Connectivity>,
}

impl AppointmentStore {
    pub async fn open(options: StoreOptions) -> Result<Self, AppError> {
        let collections = Collections::new(options.storage);

        let appointments: Vec<Appointment> = collections.load_list(APPOINTMENTS_KEY).await?;
        let users: Vec<User> = collections.load_list(USERS_KEY).await?;
        let queue: Vec<SyncQueueItem> = collections.load_list(SYNC_QUEUE_KEY).await?;
        let mut blocked: Vec<BlockedDate> = collections.load_list(BLOCKED_DATES_KEY).await?;
        let session: Option<Session> = collections.load_value(SESSION_KEY).await?;

        if options.auto_block_holidays && extend_holidays(&mut blocked, today().year(), HOLIDAY_YEARS_AHEAD) {
            let mut batch = Batch::default();
            batch.put(BLOCKED_DATES_KEY, &blocked)?;
            collections.save_batch(batch).await?;
            debug!("Blocked dates extended with generated holidays ({} total)", blocked.len());
        }

        info!(
            "Appointment store opened: {} appointment(s), {} user(s), {} queued operation(s)",
            appointments.len(),
            users.len(),
            queue.len()
        );

        let initial = if options.remote.is_some() { Connectivity::Unknown } else { Connectivity::Offline };
        let (connectivity, _) = watch::channel(initial);

        Ok(Self {
            state: Mutex::new(StoreState { appointments, users, queue, blocked, session }),
            collections,
            remote: options.remote,
            verifier: options.verifier,
            notifier: options.notifier,
            schedule: options.schedule,
            policy: options.policy,
            default_status: options.default_status,
            connectivity,
        })
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    // ---- appointments ----

    pub async fn create_appointment(&self, draft: AppointmentDraft) -> Result<Appointment, AppError> {
        let date = validate_draft(&draft)?;
        let time = draft.time.trim().to_string();

        if draft.status.is_some_and(|s| !s.is_active()) {
            return Err(AppError::Validation("New appointments must be pending or confirmed".into()));
        }
        reject_past(date)?;

        let mut state = self.state.lock().await;

        self.check_offered(date, &time, &state.blocked)?;
        if !is_slot_free(date, &time, &state.appointments, None) {
            warn!("Booking rejected: {} {} already taken", draft.date.trim(), time);
            return Err(AppError::slot_unavailable(draft.date.trim(), &time));
        }

        let mut appointment = Appointment::new(draft, self.default_status);
        let mut next = state.clone();
        let mut touched = Touched { appointments: true, ..Default::default() };

        match self.try_remote_create(&appointment).await? {
            RemoteWrite::Mirrored(remote) => {
                appointment = remote;
            }
            RemoteWrite::Queued => {
                next.queue.push(self.queue_item(SyncOperation::CreateAppointment(appointment.clone())));
                touched.queue = true;
            }
            RemoteWrite::LocalOnly => {}
        }

        if let Some(user_id) = appointment.user_id.as_deref()
            && let Some(owner) = next.users.iter_mut().find(|u| u.id == user_id)
        {
            owner.record_booking();
            touched.users = true;
        }

        next.appointments.push(appointment.clone());
        self.persist(&next, touched).await?;
        *state = next;
        drop(state);

        info!("Appointment created: {} on {} at {}", appointment.id, appointment.date, appointment.time);
        self.notifier.dispatch(NotificationEvent::new(NotificationKind::BookingCreated, &appointment));
        Ok(appointment)
    }

    pub async fn update_appointment(&self, id: &str, patch: AppointmentPatch) -> Result<Appointment, AppError> {
        if patch.status == Some(AppointmentStatus::Cancelled) {
            return Err(AppError::Validation("Use cancel_appointment to cancel a booking".into()));
        }
        self.apply_update(id, patch, None, |_| Ok(())).await
    }

    pub async fn cancel_appointment(&self, id: &str, reason: &str) -> Result<Appointment, AppError> {
        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Cancelled),
            cancellation_reason: Some(reason.trim().to_string()),
            ..Default::default()
        };
        self.apply_update(id, patch, Some(NotificationKind::BookingCancelled), |current| {
            if current.is_active() {
                Ok(())
            } else {
                Err(AppError::Validation(format!("Appointment is already {}", current.status.as_str())))
            }
        })
        .await
    }

    pub async fn confirm_appointment(&self, id: &str) -> Result<Appointment, AppError> {
        let patch = AppointmentPatch::status(AppointmentStatus::Confirmed);
        self.apply_update(id, patch, Some(NotificationKind::BookingConfirmed), |current| {
            if current.status == AppointmentStatus::Pending {
                Ok(())
            } else {
                Err(AppError::Validation(format!("Only pending appointments can be confirmed (is {})", current.status.as_str())))
            }
        })
        .await
    }

    pub async fn complete_appointment(&self, id: &str) -> Result<Appointment, AppError> {
        let patch = AppointmentPatch::status(AppointmentStatus::Completed);
        self.apply_update(id, patch, Some(NotificationKind::BookingCompleted), |current| {
            if current.is_active() {
                Ok(())
            } else {
                Err(AppError::Validation(format!("Appointment is already {}", current.status.as_str())))
            }
        })
        .await
    }

    async fn apply_update(
        &self,
        id: &str,
        patch: AppointmentPatch,
        kind: Option<NotificationKind>,
        guard: impl Fn(&Appointment) -> Result<(), AppError>,
    ) -> Result<Appointment, AppError> {
        let mut state = self.state.lock().await;
        let idx = state
            .appointment_index(id)
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;

        let current = state.appointments[idx].clone();
        guard(&current)?;

        let mut updated = current.clone();
        updated.apply(&patch);
        let date = validate_record(&updated)?;

        let slot_changed = updated.date != current.date || updated.time != current.time;
        let reactivated = updated.is_active() && !current.is_active();
        if slot_changed {
            reject_past(date)?;
        }
        if updated.is_active() && (slot_changed || reactivated) {
            self.check_offered(date, &updated.time, &state.blocked)?;
            if !is_slot_free(date, &updated.time, &state.appointments, Some(&current.id)) {
                warn!("Reschedule rejected: {} {} already taken", updated.date, updated.time);
                return Err(AppError::slot_unavailable(&updated.date, &updated.time));
            }
        }

        let mut next = state.clone();
        let mut touched = Touched { appointments: true, ..Default::default() };

        let blocked_by_queue = state.has_pending_ops_for(&current.id);
        let write = match current.remote_id.as_deref() {
            Some(remote_id) if !blocked_by_queue => self.try_remote_update(remote_id, &patch).await?,
            _ if self.remote.is_some() => RemoteWrite::Queued,
            _ => RemoteWrite::LocalOnly,
        };
        match write {
            RemoteWrite::Mirrored(remote) => updated.adopt_remote(&remote),
            RemoteWrite::Queued => {
                next.queue.push(self.queue_item(SyncOperation::UpdateAppointment {
                    appointment_id: current.id.clone(),
                    patch: patch.clone(),
                }));
                touched.queue = true;
            }
            RemoteWrite::LocalOnly => {}
        }

        next.appointments[idx] = updated.clone();
        self.persist(&next, touched).await?;
        *state = next;
        drop(state);

        let kind = kind.unwrap_or(if slot_changed {
            NotificationKind::BookingRescheduled
        } else {
            NotificationKind::BookingUpdated
        });
        info!("Appointment {} updated ({:?})", updated.id, kind);
        self.notifier.dispatch(NotificationEvent::new(kind, &updated));
        Ok(updated)
    }

    pub async fn get_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        if let Some(remote) = self.online_remote() {
            match remote.list_appointments(filter).await {
                Ok(list) => return Ok(list),
                Err(e) => warn!("Remote appointment read failed, using local copy: {}", e),
            }
        }
        self.local_appointments(filter).await
    }

    /// Reads only the local copy, regardless of connectivity.
    pub async fn local_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        let state = self.state.lock().await;
        Ok(state.appointments.iter().filter(|a| filter.matches(a)).cloned().collect())
    }

    pub async fn get_appointment(&self, id: &str) -> Result<Appointment, AppError> {
        let state = self.state.lock().await;
        state
            .appointment_index(id)
            .map(|idx| state.appointments[idx].clone())
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    pub async fn available_slots(&self, date: &str) -> Result<Vec<String>, AppError> {
        let date = parse_date(date)?;
        let state = self.state.lock().await;
        Ok(available_slots_for(date, &self.schedule, &state.blocked, &state.appointments))
    }

    pub async fn is_fully_booked(&self, date: &str) -> Result<bool, AppError> {
        let date = parse_date(date)?;
        let state = self.state.lock().await;
        Ok(is_fully_booked(date, &self.schedule, &state.blocked, &state.appointments))
    }

    // ---- blocked dates ----

    /// Takes a whole day off the calendar. Bookings already on that day stay.
    pub async fn block_date(&self, date: &str, reason: &str, kind: BlockKind) -> Result<BlockedDate, AppError> {
        let day = parse_date(date)?;
        require("reason", reason)?;

        let mut state = self.state.lock().await;
        if let Some(existing) = blocked_entry(day, &state.blocked) {
            return Err(AppError::Validation(format!("{} is already blocked ({})", existing.date, existing.reason)));
        }

        let entry = BlockedDate::manual(day, reason, kind);
        let booked = state.appointments.iter().filter(|a| a.is_active() && a.date == entry.date).count();
        if booked > 0 {
            warn!("Blocking {} which still has {} active appointment(s)", entry.date, booked);
        }

        let mut next = state.clone();
        next.blocked.push(entry.clone());
        next.blocked.sort_by(|a, b| a.date.cmp(&b.date));
        self.persist(&next, Touched { blocked: true, ..Default::default() }).await?;
        *state = next;

        info!("Date blocked: {} ({})", entry.date, entry.reason);
        Ok(entry)
    }

    /// Removes a manual block. Generated holidays are controlled by configuration.
    pub async fn unblock_date(&self, date: &str) -> Result<BlockedDate, AppError> {
        let day = parse_date(date)?;
        let mut state = self.state.lock().await;
        let Some(existing) = blocked_entry(day, &state.blocked).cloned() else {
            return Err(AppError::NotFound(format!("{} is not blocked", day.format("%Y-%m-%d"))));
        };
        if existing.auto_generated {
            return Err(AppError::Validation(format!(
                "{} ({}) is a generated holiday and cannot be unblocked",
                existing.date, existing.reason
            )));
        }

        let mut next = state.clone();
        next.blocked.retain(|b| b.date != existing.date);
        self.persist(&next, Touched { blocked: true, ..Default::default() }).await?;
        *state = next;

        info!("Date unblocked: {}", existing.date);
        Ok(existing)
    }

    pub async fn blocked_dates(&self) -> Vec<BlockedDate> {
        self.state.lock().await.blocked.clone()
    }

    // ---- users ----

    pub async fn create_user(&self, draft: NewUser) -> Result<UserProfile, AppError> {
        require("name", &draft.name)?;
        require("email", &draft.email)?;
        require("password", &draft.password)?;
        if !is_plausible_email(&draft.email) {
            return Err(AppError::Validation(format!("'{}' is not a valid email address", draft.email.trim())));
        }

        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.has_email(&draft.email)) {
            return Err(AppError::DuplicateEmail(normalize_email(&draft.email)));
        }

        let password_hash = self.verifier.hash(&draft.password)?;
        let mut user = User::new(&draft, password_hash);
        let mut next = state.clone();
        let mut touched = Touched { users: true, ..Default::default() };

        let write = match self.online_remote() {
            Some(remote) => {
                let registration = Registration {
                    name: &user.name,
                    email: &user.email,
                    phone: &user.phone,
                    password: Some(&draft.password),
                    password_hash: None,
                };
                match remote.register(&registration).await {
                    Ok(auth) => RemoteWrite::Mirrored(auth.user),
                    Err(e) if e.is_transient() => {
                        warn!("Remote registration unavailable, storing locally: {}", e);
                        RemoteWrite::Queued
                    }
                    Err(e) => return Err(e),
                }
            }
            None if self.remote.is_some() => RemoteWrite::Queued,
            None => RemoteWrite::LocalOnly,
        };
        match write {
            RemoteWrite::Mirrored(profile) => user.id = profile.id,
            RemoteWrite::Queued => {
                next.queue.push(self.queue_item(SyncOperation::CreateUser(user.clone())));
                touched.queue = true;
            }
            RemoteWrite::LocalOnly => {}
        }

        next.users.push(user.clone());
        self.persist(&next, touched).await?;
        *state = next;

        info!("User registered: {}", user.id);
        Ok(user.profile())
    }

    /// Profile edits are kept locally.
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<UserProfile, AppError> {
        let mut state = self.state.lock().await;
        let idx = state
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if let Some(email) = &patch.email {
            if !is_plausible_email(email) {
                return Err(AppError::Validation(format!("'{}' is not a valid email address", email.trim())));
            }
            if state.users.iter().any(|u| u.id != id && u.has_email(email)) {
                return Err(AppError::DuplicateEmail(normalize_email(email)));
            }
        }

        let mut next = state.clone();
        next.users[idx].apply(&patch);
        require("name", &next.users[idx].name)?;

        self.persist(&next, Touched { users: true, ..Default::default() }).await?;
        let profile = next.users[idx].profile();
        *state = next;
        Ok(profile)
    }

    pub async fn get_users(&self) -> Vec<UserProfile> {
        let state = self.state.lock().await;
        state.users.iter().map(User::profile).collect()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<UserProfile> {
        let state = self.state.lock().await;
        state.users.iter().find(|u| u.has_email(email)).map(User::profile)
    }

    // ---- authentication ----

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<Session>, AppError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();

        let mut session = None;
        if let Some(remote) = self.online_remote() {
            match remote.login(email, password).await {
                Ok(auth) => {
                    // Keep a local credential so the same login works offline later.
                    let password_hash = self.verifier.hash(password)?;
                    match next.users.iter_mut().find(|u| u.has_email(email)) {
                        Some(local) => {
                            local.name = auth.user.name.clone();
                            local.phone = auth.user.phone.clone();
                            local.role = auth.user.role;
                            local.password_hash = password_hash;
                            local.updated_at = Utc::now();
                        }
                        None => next.users.push(User::from_profile(&auth.user, password_hash)),
                    }
                    let profile = next
                        .users
                        .iter()
                        .find(|u| u.has_email(email))
                        .map(User::profile)
                        .unwrap_or(auth.user);
                    session = Some(Session::new(profile, auth.token));
                }
                Err(AppError::Unauthorized) => {
                    info!("Login rejected by remote service");
                    return Ok(None);
                }
                Err(e) if e.is_transient() => warn!("Remote login unavailable, trying local credentials: {}", e),
                Err(e) => return Err(e),
            }
        }

        if session.is_none() {
            let Some(user) = next.users.iter().find(|u| u.has_email(email)) else {
                info!("Login failed: unknown email");
                return Ok(None);
            };
            if user.password_hash.is_empty() || !self.verifier.verify(password, &user.password_hash) {
                info!("Login failed for user {}", user.id);
                return Ok(None);
            }
            session = Some(Session::new(user.profile(), None));
        }

        next.session = session.clone();
        self.persist(&next, Touched { users: true, session: true, ..Default::default() }).await?;
        if let Some(s) = &next.session {
            info!("User logged in: {}", s.user.id);
        }
        *state = next;
        Ok(session)
    }

    /// The persisted session, if it has not expired.
    pub async fn current_session(&self) -> Result<Option<Session>, AppError> {
        let mut state = self.state.lock().await;
        let expired = state.session.as_ref().is_some_and(|s| s.is_expired(Utc::now()));
        if expired {
            if let Some(s) = state.session.take() {
                info!("Session for {} expired", s.user.id);
            }
            self.collections.remove(SESSION_KEY).await?;
            return Ok(None);
        }
        Ok(state.session.clone())
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        self.collections.remove(SESSION_KEY).await?;
        state.session = None;
        Ok(())
    }

    // ---- helpers ----

    pub(crate) fn online_remote(&self) -> Option<&Arc<dyn RemoteService>> {
        self.remote.as_ref().filter(|_| *self.connectivity.borrow() == Connectivity::Online)
    }

    pub(crate) fn queue_item(&self, operation: SyncOperation) -> SyncQueueItem {
        info!("Queued {} for remote sync", operation.kind());
        SyncQueueItem::new(operation, retry_base(&self.policy))
    }

    async fn try_remote_create(&self, appointment: &Appointment) -> Result<RemoteWrite<Appointment>, AppError> {
        let Some(remote) = self.online_remote() else {
            return Ok(if self.remote.is_some() { RemoteWrite::Queued } else { RemoteWrite::LocalOnly });
        };
        match remote.create_appointment(&appointment.to_draft()).await {
            Ok(created) => {
                let mut mirrored = created.clone();
                mirrored.remote_id = Some(created.id);
                Ok(RemoteWrite::Mirrored(mirrored))
            }
            Err(e) if e.is_transient() => {
                warn!("Remote create unavailable, storing locally: {}", e);
                Ok(RemoteWrite::Queued)
            }
            Err(e) => Err(e),
        }
    }

    async fn try_remote_update(&self, remote_id: &str, patch: &AppointmentPatch) -> Result<RemoteWrite<Appointment>, AppError> {
        let Some(remote) = self.online_remote() else {
            return Ok(RemoteWrite::Queued);
        };
        match remote.update_appointment(remote_id, patch).await {
            Ok(updated) => Ok(RemoteWrite::Mirrored(updated)),
            Err(e) if e.is_transient() => {
                warn!("Remote update unavailable, storing locally: {}", e);
                Ok(RemoteWrite::Queued)
            }
            Err(e) => Err(e),
        }
    }

    fn check_offered(&self, date: NaiveDate, time: &str, blocked: &[BlockedDate]) -> Result<(), AppError> {
        if let Some(entry) = blocked_entry(date, blocked) {
            return Err(AppError::Validation(format!("{} is not available: {}", entry.date, entry.reason)));
        }
        if !is_offered(date, time, &self.schedule, blocked) {
            return Err(AppError::Validation(format!("{} is not an offered time on {}", time, date.format("%Y-%m-%d"))));
        }
        Ok(())
    }

    /// Writes every touched document in one storage batch; nothing is
    /// written if any of them fails.
    pub(crate) async fn persist(&self, next: &StoreState, touched: Touched) -> Result<(), AppError> {
        let mut batch = Batch::default();
        if touched.appointments {
            batch.put(APPOINTMENTS_KEY, &next.appointments)?;
        }
        if touched.users {
            batch.put(USERS_KEY, &next.users)?;
        }
        if touched.queue {
            batch.put(SYNC_QUEUE_KEY, &next.queue)?;
        }
        if touched.blocked {
            batch.put(BLOCKED_DATES_KEY, &next.blocked)?;
        }
        if touched.session
            && let Some(session) = &next.session
        {
            batch.put(SESSION_KEY, session)?;
        }
        self.collections.save_batch(batch).await
    }
}

/// The studio's current calendar day.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn reject_past(date: NaiveDate) -> Result<(), AppError> {
    if date < today() {
        return Err(AppError::Validation(format!("{} is in the past", date.format("%Y-%m-%d"))));
    }
    Ok(())
}

pub(crate) fn retry_base(policy: &SyncPolicy) -> chrono::Duration {
    chrono::Duration::from_std(policy.retry_base).unwrap_or_else(|_| chrono::Duration::seconds(5))
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn parse_date(date: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", date.trim())))
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn validate_draft(draft: &AppointmentDraft) -> Result<NaiveDate, AppError> {
    require("clientName", &draft.client_name)?;
    require("email", &draft.email)?;
    require("phone", &draft.phone)?;
    require("service", &draft.service)?;
    require("date", &draft.date)?;
    require("time", &draft.time)?;
    if !is_plausible_email(&draft.email) {
        return Err(AppError::Validation(format!("'{}' is not a valid email address", draft.email.trim())));
    }
    parse_date(&draft.date)
}

fn validate_record(appointment: &Appointment) -> Result<NaiveDate, AppError> {
    require("clientName", &appointment.client_name)?;
    require("email", &appointment.email)?;
    require("phone", &appointment.phone)?;
    require("service", &appointment.service)?;
    require("time", &appointment.time)?;
    parse_date(&appointment.date)
}
