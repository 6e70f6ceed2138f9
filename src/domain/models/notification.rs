use serde::Serialize;
use crate::domain::models::appointment::Appointment;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    BookingCreated,
    BookingConfirmed,
    BookingRescheduled,
    BookingUpdated,
    BookingCancelled,
    BookingCompleted,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub event_kind: NotificationKind,
    pub appointment: Appointment,
}

impl NotificationEvent {
    pub fn new(event_kind: NotificationKind, appointment: &Appointment) -> Self {
        Self {
            event_kind,
            appointment: appointment.clone(),
        }
    }
}
