pub mod memory_local_storage;
pub mod sqlite_local_storage;

pub use memory_local_storage::MemoryLocalStorage;
pub use sqlite_local_storage::SqliteLocalStorage;
