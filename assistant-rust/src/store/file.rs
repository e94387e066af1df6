use super::{KeyValueStore, StoreError};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

/// A store persisted as one JSON object (`{ key: value }`) on disk.
///
/// Each operation reads the whole file, applies the change and writes the
/// file back through a temporary sibling that is renamed into place, so a
/// reader never sees a partial write. Writers in other processes are not
/// coordinated.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

type Items = BTreeMap<String, String>;

impl JsonFileStore {
    /// The file is created on first write; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the store file, named after its full file name so that
    /// `a.json` and `a.yaml` never share one.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn read(&self) -> Result<Items, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Items::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(StoreError::File),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Items::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, items: &Items) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(items).map_err(StoreError::File)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Items),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read()?;
        f(&mut items);
        self.write(&items)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.remove(key))
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.update(|items| {
            items.insert(key.to_string(), value);
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.update(|items| {
            items.remove(key);
        })
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.update(|items| {
            for key in keys {
                items.remove(*key);
            }
        })
    }
}
