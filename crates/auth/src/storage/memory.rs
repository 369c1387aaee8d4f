use std::collections::HashMap;

use parking_lot::RwLock;

use super::KeyValueStore;
use crate::types::StorageResult;

/// Process-local store; its contents end with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("authToken", "abc").unwrap();
        assert_eq!(store.get("authToken").unwrap().as_deref(), Some("abc"));

        store.remove("authToken").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("authToken").unwrap(), None);
    }
}
