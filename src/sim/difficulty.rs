//! Level-indexed difficulty scaling

use serde::{Deserialize, Serialize};

use crate::tuning::AttackConfig;

/// Attack timing and speeds for one level. Read-only between transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: u32,
    pub dive_interval_ms: f64,
    pub enemy_fire_interval_ms: f64,
    /// Downward dive speed (pixels per frame)
    pub dive_speed: f32,
    /// Vertical speed of shots from diving enemies
    pub aimed_bullet_speed: f32,
    /// Vertical speed of shots from the formation
    pub straight_bullet_speed: f32,
}

impl Difficulty {
    /// Difficulty for `level` (1-based; 0 is treated as 1)
    pub fn for_level(level: u32, attack: &AttackConfig) -> Self {
        let level = level.max(1);
        let steps = (level - 1) as f64;
        let lf = level as f32;
        Self {
            level,
            dive_interval_ms: (attack.base_dive_interval_ms - steps * attack.dive_interval_step_ms)
                .max(attack.min_dive_interval_ms),
            enemy_fire_interval_ms: (attack.base_fire_interval_ms
                - steps * attack.fire_interval_step_ms)
                .max(attack.min_fire_interval_ms),
            dive_speed: attack.dive_speed + lf * attack.dive_speed_per_level,
            aimed_bullet_speed: attack.aimed_bullet_speed + lf * attack.aimed_bullet_speed_per_level,
            straight_bullet_speed: attack.straight_bullet_speed
                + lf * attack.straight_bullet_speed_per_level,
        }
    }
}
