//! Player preferences
//!
//! Persisted separately from the high score as one JSON blob.

use serde::{Deserialize, Serialize};

use crate::leaderboard::{LeaderboardError, sanitize_username};
use crate::persistence::{KeyValueStore, PersistenceError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sound cues off
    pub muted: bool,
    /// Saved leaderboard name (already sanitized)
    pub username: Option<String>,
    /// The player has seen the welcome prompt
    pub visited: bool,
}

impl Settings {
    pub const STORAGE_KEY: &'static str = "galaga_settings";

    /// Load settings, falling back to defaults on any problem
    pub fn load(store: &(impl KeyValueStore + ?Sized)) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Discarding malformed settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut (impl KeyValueStore + ?Sized)) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::debug!("Settings saved");
        Ok(())
    }

    pub fn is_first_visit(&self) -> bool {
        !self.visited
    }

    pub fn mark_visited(&mut self) {
        self.visited = true;
    }

    /// Returns the new muted state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Store the sanitized form of `raw`; invalid names leave the old one
    pub fn set_username(&mut self, raw: &str) -> Result<&str, LeaderboardError> {
        let clean = sanitize_username(raw)?;
        Ok(self.username.insert(clean).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.is_first_visit());
        assert!(!settings.muted);
        assert_eq!(settings.username, None);
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.mark_visited();
        settings.toggle_mute();
        settings.set_username(" ace ").unwrap();
        settings.save(&mut store).unwrap();

        let loaded = Settings::load(&store);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.username.as_deref(), Some("ACE"));
        assert!(!loaded.is_first_visit());
    }

    #[test]
    fn test_invalid_username_keeps_previous() {
        let mut settings = Settings::default();
        settings.set_username("pilot").unwrap();
        assert!(settings.set_username("x").is_err());
        assert_eq!(settings.username.as_deref(), Some("PILOT"));
    }

    #[test]
    fn test_malformed_blob_falls_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
        // Unknown and missing fields are tolerated
        store.set(Settings::STORAGE_KEY, r#"{"muted":true,"extra":1}"#).unwrap();
        assert!(Settings::load(&store).muted);
    }
}
