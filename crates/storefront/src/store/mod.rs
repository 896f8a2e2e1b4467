//! Durable key-value storage for cart state.
//!
//! # Architecture
//!
//! The cart manager never touches a backend directly. It talks to a
//! [`DurableStore`], which offers three capabilities:
//!
//! - `get` - read the serialized value under a key
//! - `set` - overwrite the value under a key (whole value, no deltas)
//! - `subscribe` - receive a [`StorageEvent`] after every successful `set`
//!
//! # Backends
//!
//! - [`MemoryStore`] - process memory, optional byte quota
//! - [`FileStore`] - one file per key under a directory
//! - [`Namespaced`] - key-prefixing wrapper so one backend can hold a cart
//!   per browser session while the cart itself always uses the key `cart`
//!
//! There is no locking across read-modify-write: the last writer wins.

mod file;
mod memory;
mod namespaced;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use namespaced::Namespaced;

/// Capacity of each store's change-event channel.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Errors returned by durable store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would exceed the store's byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The key cannot be stored by this backend.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A writer panicked while holding the store lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Published after every successful `set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Full backend key that changed.
    pub key: String,
}

/// A process-wide key-value store with change notification.
pub trait DurableStore: Send + Sync {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value under `key` and publish a [`StorageEvent`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails. No event is published then.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Subscribe to change events for every key in this store.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

impl<T: DurableStore + ?Sized> DurableStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        (**self).subscribe()
    }
}

/// Publish a change event. Having no subscribers is not an error.
pub(crate) fn publish(events: &broadcast::Sender<StorageEvent>, key: &str) {
    let _ = events.send(StorageEvent {
        key: key.to_owned(),
    });
}
