pub mod http_remote_service;

pub use http_remote_service::HttpRemoteService;
