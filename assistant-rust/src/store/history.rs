use super::{KeyValueStore, StoreError};
use crate::prompt::{HistoryKind, TaskType};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

pub const FAVORITES_KEY: &str = "favorites";

/// One AI interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// `chat`, or the code/content task name.
    #[serde(rename = "type")]
    pub entry_type: String,
    pub input: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
    /// Source language, recorded for code tasks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// An output the user chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(task: TaskType, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entry_type: task.type_name().to_string(),
            input: input.into(),
            output: output.into(),
            timestamp: Utc::now(),
            language: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// History lists and favorites on top of a [`KeyValueStore`].
///
/// Every append reads the whole list, pushes one record and writes the list
/// back. Lists grow without bound; only [`HistoryStore::clear_all`] shrinks
/// them.
#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self, kind: HistoryKind) -> Result<Vec<HistoryEntry>, StoreError> {
        self.read_list(kind.storage_key())
    }

    pub fn append_history(&self, kind: HistoryKind, entry: HistoryEntry) -> Result<(), StoreError> {
        self.append(kind.storage_key(), entry)
    }

    /// Append `entry` to the list its `task` belongs to.
    pub fn record(&self, task: TaskType, entry: HistoryEntry) -> Result<(), StoreError> {
        self.append_history(task.history_kind(), entry)
    }

    pub fn favorites(&self) -> Result<Vec<FavoriteEntry>, StoreError> {
        self.read_list(FAVORITES_KEY)
    }

    pub fn add_favorite(
        &self,
        entry_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<FavoriteEntry, StoreError> {
        let favorite = FavoriteEntry {
            id: Uuid::new_v4().to_string(),
            entry_type: entry_type.into(),
            content: content.into(),
            timestamp: Utc::now(),
        };
        self.append(FAVORITES_KEY, favorite.clone())?;
        Ok(favorite)
    }

    /// Drop the three history lists and the favorites in one store call.
    /// The session marker is left alone.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let mut keys: Vec<&str> = HistoryKind::ALL
            .into_iter()
            .map(HistoryKind::storage_key)
            .collect();
        keys.push(FAVORITES_KEY);
        self.store.remove_items(&keys)?;
        tracing::debug!(?keys, "cleared history and favorites");
        Ok(())
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.store.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Value {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    fn append<T: Serialize + DeserializeOwned>(&self, key: &str, item: T) -> Result<(), StoreError> {
        let mut list: Vec<T> = self.read_list(key)?;
        list.push(item);
        let raw = serde_json::to_string(&list).map_err(|source| StoreError::Value {
            key: key.to_string(),
            source,
        })?;
        self.store.set_item(key, raw)
    }
}
