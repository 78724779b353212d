//! Delayed effects
//!
//! Timers are entries stamped with the session generation that created
//! them. A restart bumps the generation, so anything left over from the
//! previous run is dropped instead of firing into the new one.

use super::state::EntityId;

/// What a timer does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// READY -> PLAYING after the intro
    BeginPlay,
    /// LEVEL_TRANSITION -> next stage
    AdvanceLevel,
    /// Lose a life, then respawn or end the game
    ResolvePlayerDeath,
    /// Respawn shield expires
    EndInvincibility,
    /// Wrapped diver takes its slot again
    RejoinFormation { enemy: EntityId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerEntry {
    pub due_ms: f64,
    pub generation: u64,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Default)]
pub struct Schedule {
    entries: Vec<TimerEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, generation: u64, due_ms: f64, kind: TimerKind) {
        self.entries.push(TimerEntry {
            due_ms,
            generation,
            kind,
        });
    }

    /// Remove every entry due at `now_ms` and return the ones belonging to
    /// `generation`, earliest first. Stale entries are discarded.
    pub fn take_due(&mut self, now_ms: f64, generation: u64) -> Vec<TimerKind> {
        let mut due = Vec::new();
        let mut stale = 0usize;
        self.entries.retain(|entry| {
            if entry.due_ms > now_ms {
                return true;
            }
            if entry.generation == generation {
                due.push(*entry);
            } else {
                stale += 1;
            }
            false
        });
        if stale > 0 {
            log::debug!("Discarded {} stale timer(s)", stale);
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|entry| entry.kind).collect()
    }

    /// Pending entries, including stale ones not yet due
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the first pending `kind` for `generation`
    pub fn due_time(&self, generation: u64, kind: TimerKind) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.generation == generation && e.kind == kind)
            .map(|e| e.due_ms)
            .min_by(f64::total_cmp)
    }
}
