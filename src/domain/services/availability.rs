use std::collections::HashSet;
use chrono::NaiveDate;
use crate::domain::models::appointment::Appointment;
use crate::domain::models::blocked_date::BlockedDate;
use crate::domain::models::schedule::WeeklySchedule;

/// The block entry covering `date`, if any.
pub fn blocked_entry(date: NaiveDate, blocked: &[BlockedDate]) -> Option<&BlockedDate> {
    let date_str = date.format("%Y-%m-%d").to_string();
    blocked.iter().find(|b| b.date == date_str)
}

/// Labels bookable on `date`: none on a blocked day, otherwise the weekday's.
fn offered_labels<'a>(date: NaiveDate, schedule: &'a WeeklySchedule, blocked: &[BlockedDate]) -> &'a [String] {
    if blocked_entry(date, blocked).is_some() {
        return &[];
    }
    schedule.slots_for(date)
}

/// Time labels on `date` that are held by an active appointment.
fn occupied_labels<'a>(date: NaiveDate, appointments: &'a [Appointment]) -> HashSet<&'a str> {
    let date_str = date.format("%Y-%m-%d").to_string();
    appointments
        .iter()
        .filter(|a| a.is_active() && a.date == date_str)
        .map(|a| a.time.as_str())
        .collect()
}

/// Configured labels for the weekday of `date`, minus the ones already taken.
/// Order follows the schedule configuration.
pub fn available_slots_for(
    date: NaiveDate,
    schedule: &WeeklySchedule,
    blocked: &[BlockedDate],
    appointments: &[Appointment],
) -> Vec<String> {
    let taken = occupied_labels(date, appointments);
    offered_labels(date, schedule, blocked)
        .iter()
        .filter(|label| !taken.contains(label.as_str()))
        .cloned()
        .collect()
}

/// True only when the day has slots and all of them are taken.
/// A closed or blocked day is never fully booked.
pub fn is_fully_booked(
    date: NaiveDate,
    schedule: &WeeklySchedule,
    blocked: &[BlockedDate],
    appointments: &[Appointment],
) -> bool {
    let configured = offered_labels(date, schedule, blocked);
    if configured.is_empty() {
        return false;
    }
    let taken = occupied_labels(date, appointments);
    configured.iter().all(|label| taken.contains(label.as_str()))
}

pub fn is_offered(date: NaiveDate, time: &str, schedule: &WeeklySchedule, blocked: &[BlockedDate]) -> bool {
    offered_labels(date, schedule, blocked).iter().any(|label| label == time)
}

/// Whether `time` on `date` is free, ignoring the appointment with id `exclude_id`.
pub fn is_slot_free(
    date: NaiveDate,
    time: &str,
    appointments: &[Appointment],
    exclude_id: Option<&str>,
) -> bool {
    let date_str = date.format("%Y-%m-%d").to_string();
    !appointments.iter().any(|a| {
        a.is_active()
            && a.date == date_str
            && a.time == time
            && exclude_id.is_none_or(|id| a.id != id)
    })
}
