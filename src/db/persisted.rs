use super::storage::{KeyValueStorage, StorageError};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value mirrored into a single key of a [`KeyValueStorage`].
///
/// Loading never fails: a missing key, unparsable content or an unavailable
/// backend all yield the fallback. Every `set` writes the whole value back;
/// a failed write is logged and the in-memory value is kept.
pub struct PersistedStore<T, S> {
    key: String,
    value: T,
    storage: S,
}

impl<T, S> PersistedStore<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStorage,
{
    pub fn load(storage: S, key: impl Into<String>, fallback: T) -> Self {
        let key = key.into();
        let value = match read_value(&storage, &key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("no stored value under '{}', using fallback", key);
                fallback
            }
            Err(e) => {
                warn!("failed to load '{}' from storage, using fallback: {}", key, e);
                fallback
            }
        };

        Self {
            key,
            value,
            storage,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        if let Err(e) = self.write_back() {
            warn!("failed to persist '{}': {}", self.key, e);
        }
    }

    pub fn update<F>(&mut self, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = updater(&self.value);
        self.set(next);
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn write_back(&mut self) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&self.value)?;
        self.storage.set_item(&self.key, &serialized)
    }
}

fn read_value<T, S>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStorage,
{
    match storage.get_item(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}
