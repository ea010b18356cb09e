//! Persistence adapter: a string-keyed store that survives page reloads.
//!
//! The game writes through [`KeyValueStore`] only. In the browser that is
//! [`LocalStore`] (`window.localStorage`); tests and browsers with storage
//! disabled use [`MemoryStore`].

use std::collections::HashMap;

use crate::error::StorageError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory store. Cloning snapshots the contents, which is how tests
/// simulate "close the tab and come back".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// When set, every write fails as if the quota were exhausted.
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".into(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

/// `window.localStorage`.
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    /// Returns `None` when there is no window or storage is blocked
    /// (private browsing, disabled cookies).
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        read_or_warn(key, self.storage.get_item(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{e:?}"),
            })
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.clear().map_err(|_| StorageError::Unavailable)
    }
}

/// A failed read is logged and treated as a missing key.
fn read_or_warn<E: std::fmt::Debug>(key: &str, result: Result<Option<String>, E>) -> Option<String> {
    match result {
        Ok(value) => value,
        Err(e) => {
            let err = StorageError::Read {
                key: key.to_string(),
                reason: format!("{e:?}"),
            };
            log::warn!("{err}");
            None
        }
    }
}

/// Either backend, chosen at startup.
pub enum BrowserStore {
    Local(LocalStore),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn open() -> Self {
        match LocalStore::open() {
            Some(local) => BrowserStore::Local(local),
            None => {
                log::warn!("localStorage unavailable, progress will not survive a reload");
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStore::Local(s) => s.get(key),
            BrowserStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            BrowserStore::Local(s) => s.set(key, value),
            BrowserStore::Memory(s) => s.set(key, value),
        }
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match self {
            BrowserStore::Local(s) => s.clear(),
            BrowserStore::Memory(s) => s.clear(),
        }
    }
}
