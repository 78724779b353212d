//! Local best score
//!
//! One integer kept in the key-value store. Only ever moves up.

use crate::persistence::{KeyValueStore, PersistenceError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalHighScore {
    best: u64,
}

impl LocalHighScore {
    pub const STORAGE_KEY: &'static str = "galaga_highscore";

    /// Read the stored value. Missing or unparsable data counts as zero.
    pub fn load(store: &(impl KeyValueStore + ?Sized)) -> Self {
        let best = match store.get(Self::STORAGE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring malformed high score {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Could not read high score: {}", e);
                0
            }
        };
        log::info!("Local high score: {}", best);
        Self { best }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Keep the max; returns true if `score` is a new best
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Write the max of the stored and in-memory values
    pub fn save(&self, store: &mut (impl KeyValueStore + ?Sized)) -> Result<(), PersistenceError> {
        let stored = Self::load(&*store).best;
        if stored >= self.best {
            return Ok(());
        }
        store.set(Self::STORAGE_KEY, &self.best.to_string())
    }
}
