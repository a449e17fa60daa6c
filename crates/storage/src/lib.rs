#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
pub mod store;

pub use repository::{InMemoryBackend, KeyValueBackend, Storage, StorageError};
pub use store::{DEFAULT_NAMESPACE, KeyValueStore};
