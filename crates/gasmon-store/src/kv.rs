//! The key-value abstraction every tier is persisted through.

use std::sync::Arc;

use crate::error::Result;

/// A durable string-keyed store with get/set/remove semantics.
///
/// Each tier of sensor data lives under one key as a UTF-8 JSON document.
/// Implementations are expected to be read-modify-write safe for a single
/// writer; no cross-process locking is provided.
///
/// # Example
///
/// ```
/// use gasmon_store::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("todays_data", "[]")?;
/// assert_eq!(store.get("todays_data")?.as_deref(), Some("[]"));
/// store.remove("todays_data")?;
/// assert!(store.get("todays_data")?.is_none());
/// # Ok::<(), gasmon_store::Error>(())
/// ```
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
