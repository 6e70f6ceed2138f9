pub mod appointment;
pub mod blocked_date;
pub mod notification;
pub mod schedule;
pub mod session;
pub mod sync;
pub mod user;
