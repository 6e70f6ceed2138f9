use std::collections::{HashSet, VecDeque};
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use crate::domain::models::{
    appointment::{Appointment, AppointmentFilter},
    sync::{Connectivity, DrainReport, ReconcileReport, SyncOperation, SyncQueueItem, SyncStatus},
};
use crate::domain::ports::{Registration, RemoteService};
use crate::domain::services::store::{retry_base, AppointmentStore, Touched};
use crate::error::AppError;

/// Result of replaying one queued operation against the remote service.
enum Replay {
    Synced,
    /// Waiting on an earlier operation; no attempt consumed.
    Deferred,
    /// Nothing left to send.
    Skipped(&'static str),
}

impl AppointmentStore {
    pub fn connectivity(&self) -> Connectivity {
        *self.connectivity.borrow()
    }

    pub fn subscribe_connectivity(&self) -> watch::Receiver<Connectivity> {
        self.connectivity.subscribe()
    }

    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn sync_status(&self) -> SyncStatus {
        let queue_size = self.state.lock().await.queue.len();
        SyncStatus {
            connectivity: self.connectivity(),
            queue_size,
            remote_configured: self.remote_configured(),
        }
    }

    /// Snapshot of the pending operations in FIFO order.
    pub async fn pending_operations(&self) -> Vec<SyncQueueItem> {
        self.state.lock().await.queue.clone()
    }

    /// Calls the health endpoint and publishes the result. Runs without the
    /// store lock; a timeout counts as offline.
    pub async fn check_connectivity(&self) -> Connectivity {
        let Some(remote) = &self.remote else {
            return Connectivity::Offline;
        };

        let reachable = match timeout(self.policy.health_timeout, remote.health()).await {
            Ok(Ok(healthy)) => healthy,
            Ok(Err(e)) => {
                debug!("Health check failed: {}", e);
                false
            }
            Err(_) => {
                debug!("Health check timed out after {:?}", self.policy.health_timeout);
                false
            }
        };

        let next = if reachable { Connectivity::Online } else { Connectivity::Offline };
        let previous = self.connectivity.send_replace(next);
        if previous != next {
            match next {
                Connectivity::Online => info!("Remote service reachable ({:?} -> Online)", previous),
                _ => warn!("Remote service unreachable ({:?} -> {:?}), working offline", previous, next),
            }
        }
        next
    }

    /// One round of the sync worker: check connectivity, then drain. A transition to
    /// online drains everything regardless of backoff and reconciles.
    pub async fn sync_tick(&self) -> Result<DrainReport, AppError> {
        let previous = self.connectivity();
        if self.check_connectivity().await != Connectivity::Online {
            return Ok(DrainReport::default());
        }

        if previous == Connectivity::Online {
            return self.process_sync_queue(false).await;
        }

        let report = self.process_sync_queue(true).await?;
        if let Err(e) = self.reconcile().await {
            warn!("Reconciliation after reconnect failed: {}", e);
        }
        Ok(report)
    }

    /// Replays queued operations in FIFO order. Items that are not yet due are
    /// kept unless `ignore_backoff` is set.
    pub async fn process_sync_queue(&self, ignore_backoff: bool) -> Result<DrainReport, AppError> {
        let mut report = DrainReport::default();
        let Some(remote) = self.online_remote().cloned() else {
            return Ok(report);
        };

        let mut state = self.state.lock().await;
        if state.queue.is_empty() {
            return Ok(report);
        }

        let mut next = state.clone();
        let mut pending: VecDeque<SyncQueueItem> = std::mem::take(&mut next.queue).into();
        let base = retry_base(&self.policy);
        let now = Utc::now();
        let mut kept: Vec<SyncQueueItem> = Vec::with_capacity(pending.len());

        while let Some(mut item) = pending.pop_front() {
            if !ignore_backoff && !item.is_due(now) {
                kept.push(item);
                continue;
            }

            let queued = QueuedAround { earlier: &kept, later: &pending };
            let outcome = replay(remote.as_ref(), &item.operation, &mut next.appointments, queued).await;
            match outcome {
                Ok(Replay::Synced) => {
                    debug!("Synced queued {} ({})", item.operation.kind(), item.id);
                    report.synced += 1;
                }
                Ok(Replay::Deferred) => {
                    report.deferred += 1;
                    kept.push(item);
                }
                Ok(Replay::Skipped(reason)) => {
                    warn!("Discarding queued {} ({}): {}", item.operation.kind(), item.id, reason);
                    report.dropped += 1;
                }
                Err(e) if e.is_transient() => {
                    item.record_failure(e.to_string(), base, Utc::now());
                    if item.attempts >= self.policy.max_attempts {
                        warn!(
                            "Giving up on queued {} ({}) after {} attempts: {}",
                            item.operation.kind(),
                            item.id,
                            item.attempts,
                            e
                        );
                        report.dropped += 1;
                    } else {
                        debug!("Queued {} ({}) failed, attempt {}: {}", item.operation.kind(), item.id, item.attempts, e);
                        report.retried += 1;
                        kept.push(item);
                    }
                }
                Err(e) => {
                    warn!("Remote rejected queued {} ({}), dropping: {}", item.operation.kind(), item.id, e);
                    report.dropped += 1;
                }
            }
        }

        next.queue = kept;
        self.persist(&next, Touched { appointments: true, queue: true, ..Default::default() }).await?;
        *state = next;

        info!(
            "Sync queue drained: {} synced, {} retried, {} deferred, {} dropped, {} remaining",
            report.synced,
            report.retried,
            report.deferred,
            report.dropped,
            state.queue.len()
        );
        Ok(report)
    }

    /// Pushes local records the remote does not know about and lets the remote
    /// copy win where both exist. Records with pending queue items are left to
    /// the queue.
    pub async fn reconcile(&self) -> Result<ReconcileReport, AppError> {
        let mut report = ReconcileReport::default();
        let Some(remote) = self.online_remote().cloned() else {
            return Ok(report);
        };

        let mut state = self.state.lock().await;
        let mut next = state.clone();

        match remote.list_users().await {
            Ok(remote_users) => {
                for user in &next.users {
                    let queued = next
                        .queue
                        .iter()
                        .any(|item| matches!(&item.operation, SyncOperation::CreateUser(u) if u.id == user.id));
                    if queued || remote_users.iter().any(|r| user.has_email(&r.email)) {
                        continue;
                    }
                    match remote.register(&Registration::replay(user)).await {
                        Ok(_) | Err(AppError::DuplicateEmail(_)) => report.users_pushed += 1,
                        Err(e) => warn!("Could not push user {} to remote: {}", user.id, e),
                    }
                }
            }
            Err(e) => warn!("Skipping user reconciliation: {}", e),
        }

        let remote_appointments = remote.list_appointments(&AppointmentFilter::default()).await?;

        // A remote record belongs to at most one local record. Linked records
        // claim theirs up front; the rest may only pair with unclaimed ones.
        let mut claimed: HashSet<String> = next.appointments.iter().filter_map(|a| a.remote_id.clone()).collect();

        for idx in 0..next.appointments.len() {
            let local = next.appointments[idx].clone();
            if next.has_pending_ops_for(&local.id) {
                continue;
            }

            let counterpart = match local.remote_id.as_deref() {
                Some(remote_id) => remote_appointments.iter().find(|r| r.id == remote_id),
                None => {
                    let candidates: Vec<&Appointment> = remote_appointments
                        .iter()
                        .filter(|r| !claimed.contains(&r.id) && r.natural_key() == local.natural_key())
                        .collect();
                    let found = candidates
                        .iter()
                        .find(|r| r.is_active() == local.is_active())
                        .or(candidates.first())
                        .copied();
                    if let Some(r) = found {
                        claimed.insert(r.id.clone());
                    }
                    found
                }
            };

            match counterpart {
                Some(remote_copy) => {
                    let mut adopted = local.clone();
                    adopted.adopt_remote(remote_copy);
                    if adopted != local {
                        debug!("Adopting remote copy of appointment {}", local.id);
                        next.appointments[idx] = adopted;
                        report.appointments_adopted += 1;
                    }
                }
                None if local.remote_id.is_none() && local.is_active() => {
                    match remote.create_appointment(&local.to_draft()).await {
                        Ok(created) => {
                            claimed.insert(created.id.clone());
                            next.appointments[idx].adopt_remote(&created);
                            report.appointments_pushed += 1;
                        }
                        Err(e) => warn!("Could not push appointment {} to remote: {}", local.id, e),
                    }
                }
                None => {}
            }
        }

        self.persist(&next, Touched { appointments: true, users: true, queue: true, ..Default::default() })
            .await?;
        *state = next;

        info!(
            "Reconciled with remote: {} user(s) pushed, {} appointment(s) pushed, {} adopted",
            report.users_pushed, report.appointments_pushed, report.appointments_adopted
        );
        Ok(report)
    }
}

/// Queue items around the one being replayed.
struct QueuedAround<'a> {
    earlier: &'a [SyncQueueItem],
    later: &'a VecDeque<SyncQueueItem>,
}

impl QueuedAround<'_> {
    fn touches(&self, appointment_id: &str) -> bool {
        self.earlier
            .iter()
            .chain(self.later.iter())
            .any(|item| item.operation.appointment_id() == Some(appointment_id))
    }

    fn create_pending(&self, appointment_id: &str) -> bool {
        self.earlier.iter().any(|item| {
            matches!(&item.operation, SyncOperation::CreateAppointment(a) if a.id == appointment_id)
        })
    }
}

/// Records what the remote stored. While other queued operations still have
/// to change this appointment, only the link is taken so local edits survive
/// even if those operations are eventually dropped.
fn settle(local: &mut Appointment, remote_copy: &Appointment, queued: &QueuedAround<'_>) {
    if queued.touches(&local.id) {
        local.remote_id = Some(remote_copy.id.clone());
    } else {
        local.adopt_remote(remote_copy);
    }
}

async fn replay(
    remote: &dyn RemoteService,
    operation: &SyncOperation,
    appointments: &mut [Appointment],
    queued: QueuedAround<'_>,
) -> Result<Replay, AppError> {
    match operation {
        SyncOperation::CreateAppointment(snapshot) => {
            // Send the record as it is now, not as it was when queued.
            let Some(local) = appointments.iter_mut().find(|a| a.id == snapshot.id) else {
                return Ok(Replay::Skipped("appointment no longer exists locally"));
            };
            if let Some(remote_id) = &local.remote_id {
                debug!("Appointment {} already linked to {}", local.id, remote_id);
                return Ok(Replay::Synced);
            }
            let created = remote.create_appointment(&local.to_draft()).await?;
            settle(local, &created, &queued);
            Ok(Replay::Synced)
        }
        SyncOperation::UpdateAppointment { appointment_id, patch } => {
            if queued.create_pending(appointment_id) {
                return Ok(Replay::Deferred);
            }

            let Some(local) = appointments.iter_mut().find(|a| a.id == *appointment_id) else {
                return Ok(Replay::Skipped("appointment no longer exists locally"));
            };
            let Some(remote_id) = local.remote_id.clone() else {
                return Ok(Replay::Skipped("appointment was never created remotely"));
            };

            let updated = remote.update_appointment(&remote_id, patch).await?;
            settle(local, &updated, &queued);
            Ok(Replay::Synced)
        }
        SyncOperation::CreateUser(user) => match remote.register(&Registration::replay(user)).await {
            Ok(_) => Ok(Replay::Synced),
            Err(AppError::DuplicateEmail(_)) => {
                debug!("User {} already registered remotely", user.id);
                Ok(Replay::Synced)
            }
            Err(e) => Err(e),
        },
    }
}
