pub mod auth;
pub mod factory;
pub mod notify;
pub mod remote;
pub mod storage;
