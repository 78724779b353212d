//! Read-only view of a session for renderers

use serde::Serialize;

use super::session::GameSession;
use super::state::{Bullet, Enemy, Explosion, GamePhase, Player};

/// Explosion with its precomputed draw radius
#[derive(Debug, Clone, Serialize)]
pub struct ExplosionView {
    #[serde(flatten)]
    pub explosion: Explosion,
    pub radius: f32,
    /// 0.0 at spawn, 1.0 when it expires
    pub progress: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub paused: bool,
    pub level: u32,
    pub score: u64,
    pub high_score: u64,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub player: Player,
    /// Remaining respawn shield, for blinking
    pub invincible_ms: f64,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub explosions: Vec<ExplosionView>,
    /// Rank reported by the leaderboard for the finished run
    pub rank: Option<usize>,
    pub is_personal_best: Option<bool>,
    /// Why the finished run was not recorded
    pub submission_error: Option<String>,
}

impl GameSession {
    pub fn snapshot(&self) -> Snapshot {
        let config = self.config();
        let store = self.store();
        let explosions = store
            .explosions()
            .iter()
            .map(|x| ExplosionView {
                explosion: x.clone(),
                radius: x.radius(config),
                progress: (x.frames as f32 / x.lifetime(config).max(1) as f32).min(1.0),
            })
            .collect();
        let submission = self.last_submission();

        Snapshot {
            phase: self.phase(),
            paused: self.is_paused(),
            level: self.level(),
            score: self.score(),
            high_score: self.high_score().max(self.score()),
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            player: store.player().clone(),
            invincible_ms: store.player().invincibility_remaining_ms(self.now_ms()),
            enemies: store.enemies().iter().filter(|e| e.is_alive()).cloned().collect(),
            bullets: store.bullets().iter().filter(|b| b.active).cloned().collect(),
            enemy_bullets: store.enemy_bullets().iter().filter(|b| b.active).cloned().collect(),
            explosions,
            rank: submission.and_then(|s| s.rank),
            is_personal_best: submission.and_then(|s| s.is_personal_best),
            submission_error: submission
                .filter(|s| !s.success)
                .and_then(|s| s.error.clone()),
        }
    }

    /// Snapshot encoded for a JavaScript renderer
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }
}
