//! Galaga-style arcade simulation core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (entities, waves, collisions, state machine)
//! - `platform`: Frame clock and input mapping for the host loop
//! - `leaderboard`: Boundary to the remote score service
//! - `highscores`: Local best-score tracking
//! - `persistence`: Key-value storage back-ends
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::LocalHighScore;
pub use leaderboard::{Leaderboard, LeaderboardError, ScoreService, SubmitOutcome};
pub use settings::Settings;
pub use tuning::{ConfigError, GameConfig};

/// Loop timing constants
pub mod consts {
    /// Frame interval the per-frame velocities were tuned at (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Upper bound on the velocity scale applied to a single frame
    pub const MAX_FRAME_SCALE: f32 = 3.0;
    /// Height above the playfield where wrapped divers re-enter
    pub const REENTRY_Y: f32 = -30.0;
    /// Slack beyond the playfield edges before a bullet is pruned
    pub const OFFSCREEN_MARGIN: f32 = 20.0;
}

/// Velocity multiplier for a frame of `dt_ms`, relative to 60 fps
#[inline]
pub fn frame_scale(dt_ms: f64) -> f32 {
    ((dt_ms / consts::FRAME_MS) as f32).clamp(0.0, consts::MAX_FRAME_SCALE)
}
