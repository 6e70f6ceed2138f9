pub mod availability;
pub mod collections;
pub mod store;
pub mod sync;
