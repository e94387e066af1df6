use super::{KeyValueStore, StoreError};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Values are plain strings, so a panic elsewhere cannot leave the map half
    // updated.
    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.items().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items().remove(key);
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut items = self.items();
        for key in keys {
            items.remove(*key);
        }
        Ok(())
    }
}
