//! Key-prefixing store wrapper.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::{DurableStore, StorageEvent, StoreError};

/// Scopes every key of an inner store under `{namespace}:`.
///
/// Subscribers see the inner store's events, i.e. full prefixed keys from
/// every namespace.
#[derive(Clone)]
pub struct Namespaced {
    inner: Arc<dyn DurableStore>,
    namespace: String,
}

impl Namespaced {
    #[must_use]
    pub fn new(inner: Arc<dyn DurableStore>, namespace: impl Into<String>) -> Self {
        Self {
            inner,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The backend key a scoped key maps to.
    #[must_use]
    pub fn scoped_key(&self, key: &str) -> String {
        format!("{}:{key}", self.namespace)
    }
}

impl std::fmt::Debug for Namespaced {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespaced")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl DurableStore for Namespaced {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(&self.scoped_key(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(&self.scoped_key(key), value)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_namespaces_are_isolated() {
        let backend: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let alice = Namespaced::new(Arc::clone(&backend), "alice");
        let bob = Namespaced::new(Arc::clone(&backend), "bob");

        alice.set("cart", "[1]").unwrap();
        bob.set("cart", "[2]").unwrap();

        assert_eq!(alice.get("cart").unwrap().as_deref(), Some("[1]"));
        assert_eq!(bob.get("cart").unwrap().as_deref(), Some("[2]"));
        assert_eq!(backend.get("alice:cart").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_events_carry_full_key() {
        let backend: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let scoped = Namespaced::new(backend, "alice");
        let mut events = scoped.subscribe();
        scoped.set("cart", "[]").unwrap();
        assert_eq!(events.try_recv().unwrap().key, "alice:cart");
    }
}
