//! Key-value text store contract and in-memory implementation.

use super::StoreResult;
use std::collections::HashMap;

/// Durable text store addressed by string keys.
pub trait KvStore {
    /// Returns the stored text, or `None` when the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the text stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Deletes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// Process-local store, used for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KvStore, MemoryKvStore};

    #[test]
    fn set_replaces_and_remove_clears() {
        let mut store = MemoryKvStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
