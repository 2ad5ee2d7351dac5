/*!
Storage adapters for persisted store state.

This module defines the storage abstraction (port) and the built-in adapters.
The core pipeline is independent of storage details, so new backends only need
to implement [`StorageAdapter`]. All backends are synchronous by contract; the
hydration and write-through paths run to completion without suspension.
*/

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::Result;

pub mod local;

pub use local::LocalFileStorage;

/// Shared handle to a storage backend.
///
/// Handles are reference-counted because one backend is typically shared by
/// every store attached in a process (and the default backend is shared by
/// construction).
pub type StorageHandle = Arc<dyn StorageAdapter>;

/// Synchronous string key-value storage abstraction
///
/// This trait defines the interface that all storage implementations must
/// provide: read a string value by key and write a string value under a key.
pub trait StorageAdapter {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// `Ok(Some(value))` if the key is present, `Ok(None)` if it is absent,
    /// or an error if the backend failed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any existing value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage adapter
///
/// Stores values in a `HashMap` guarded by a mutex. This is the built-in
/// default backend: always available, shared process-wide, and gone when the
/// process exits.
///
/// # Example
/// ```rust
/// use writeback_core::storage::{MemoryStorage, StorageAdapter};
///
/// let storage = MemoryStorage::new();
/// storage.set("greeting", "hello")?;
/// assert_eq!(storage.get("greeting")?, Some("hello".to_string()));
/// assert_eq!(storage.get("missing")?, None);
/// # Ok::<(), writeback_core::WritebackError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory storage adapter
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self
            .data
            .lock()
            .map_err(|_| crate::WritebackError::storage("memory storage mutex poisoned"))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| crate::WritebackError::storage("memory storage mutex poisoned"))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Process-wide default backend
static DEFAULT_STORAGE: Lazy<Arc<MemoryStorage>> = Lazy::new(|| Arc::new(MemoryStorage::new()));

/// Handle to the process-wide default storage backend
///
/// Every store that neither declares its own `storage` nor inherits one from
/// a global configuration is persisted here.
pub fn default_storage() -> StorageHandle {
    DEFAULT_STORAGE.clone()
}
