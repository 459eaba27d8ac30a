//! Key-value persistence boundary.
//!
//! The cart only needs two operations from its backing store: read a string
//! by key and overwrite a string by key. Anything that can do that (device
//! storage, a file, a map in memory) can back a [`CartStore`](crate::CartStore).

use std::future::Future;

use crate::error::StorageError;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Asynchronous string store addressed by key.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}
