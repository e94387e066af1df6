//! Local persistence modelled on browser local storage: string values under
//! string keys, with JSON-encoded lists on top.

mod file;
mod history;
mod memory;

pub use file::JsonFileStore;
pub use history::{FavoriteEntry, HistoryEntry, HistoryStore, FAVORITES_KEY};
pub use memory::MemoryStore;

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage file is not a JSON object: {0}")]
    File(#[source] serde_json::Error),
    #[error("Invalid JSON stored under '{key}': {source}")]
    Value {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A flat key-value store. Every operation is a whole-value read or write;
/// callers doing read-modify-write get last-writer-wins semantics.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Remove several keys. Implementations that can should make the removal
    /// visible all at once.
    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        (**self).remove_items(keys)
    }
}
