//! Browser LocalStorage back-end

use web_sys::Storage;

use super::{KeyValueStore, PersistenceError};

pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Fails when the page has no window or storage is blocked
    pub fn open() -> Result<Self, PersistenceError> {
        let storage = web_sys::window()
            .ok_or_else(|| PersistenceError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| PersistenceError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))
    }
}
