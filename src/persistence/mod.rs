//! Key-value persistence
//!
//! Small string blobs (high score, settings) keyed by name. Back-ends:
//! - [`MemoryStore`]: tests and throwaway sessions
//! - [`JsonFileStore`]: native, one JSON object on disk
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)

use std::fmt;

#[cfg(not(target_arch = "wasm32"))]
mod file;
mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;
pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    /// Storage missing or refusing access (private mode, quota)
    Unavailable(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "storage I/O error: {}", e),
            PersistenceError::Serde(e) => write!(f, "malformed stored data: {}", e),
            PersistenceError::Unavailable(reason) => write!(f, "storage unavailable: {}", reason),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Serde(e) => Some(e),
            PersistenceError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        PersistenceError::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        PersistenceError::Serde(e)
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}
