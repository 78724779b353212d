//! Data-driven game balance
//!
//! Every number the simulation reads lives in [`GameConfig`]. The defaults
//! reproduce the reference arcade feel at 60 fps; a JSON file can override
//! any subset of fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::EnemyKind;

/// One row of the formation layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub kind: EnemyKind,
    pub count: u32,
    /// Column offset used to center a short row in the grid
    pub offset: u32,
}

/// Formation grid geometry and breathing motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub cols: u32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub top_offset: f32,
    /// Horizontal breathing amplitude in pixels
    pub breathe_amplitude: f32,
    /// Breathing angular frequency (radians per second)
    pub breathe_rate: f32,
    /// Update ticks between two spawns from the pending queue
    pub spawn_every_ticks: u64,
    pub layout: Vec<LayoutRow>,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            cols: 10,
            cell_width: 32.0,
            cell_height: 32.0,
            top_offset: 60.0,
            breathe_amplitude: 10.0,
            breathe_rate: 2.0,
            spawn_every_ticks: 10,
            layout: vec![
                LayoutRow { kind: EnemyKind::Boss, count: 4, offset: 3 },
                LayoutRow { kind: EnemyKind::Butterfly, count: 8, offset: 1 },
                LayoutRow { kind: EnemyKind::Butterfly, count: 8, offset: 1 },
                LayoutRow { kind: EnemyKind::Bee, count: 10, offset: 0 },
                LayoutRow { kind: EnemyKind::Bee, count: 10, offset: 0 },
            ],
        }
    }
}

/// Player ship parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pixels per frame
    pub speed: f32,
    /// Distance from the bottom edge
    pub bottom_offset: f32,
    /// Horizontal clamp margin
    pub edge_margin: f32,
    /// Bullet speed in pixels per frame
    pub bullet_speed: f32,
    /// Minimum time between volleys (exclusive)
    pub fire_cooldown_ms: f64,
    pub max_bullets: usize,
    pub max_bullets_dual: usize,
    /// Horizontal offset of the twin guns when dual
    pub dual_spread: f32,
    /// Bullets leave the gun this far above the ship's center
    pub muzzle_offset: f32,
    pub initial_lives: u32,
    pub respawn_delay_ms: f64,
    pub invincibility_ms: f64,
    /// Scores at which an extra life is awarded
    pub bonus_life_at: Vec<u64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            bottom_offset: 50.0,
            edge_margin: 20.0,
            bullet_speed: 10.0,
            fire_cooldown_ms: 200.0,
            max_bullets: 2,
            max_bullets_dual: 4,
            dual_spread: 10.0,
            muzzle_offset: 10.0,
            initial_lives: 3,
            respawn_delay_ms: 2000.0,
            invincibility_ms: 3000.0,
            bonus_life_at: vec![20_000, 70_000],
        }
    }
}

/// Dive and enemy fire parameters, including per-level scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub base_dive_interval_ms: f64,
    pub dive_interval_step_ms: f64,
    pub min_dive_interval_ms: f64,
    pub base_fire_interval_ms: f64,
    pub fire_interval_step_ms: f64,
    pub min_fire_interval_ms: f64,
    /// Downward dive speed at level 1 plus per-level increment
    pub dive_speed: f32,
    pub dive_speed_per_level: f32,
    /// Dive progress added per frame (feeds the wobble phase)
    pub dive_progress_step: f32,
    pub wobble_amplitude: f32,
    pub steering_gain: f32,
    /// Delay between wrapping past the bottom and rejoining formation
    pub return_delay_ms: f64,
    /// Probability that a shot comes from a diving enemy when one exists
    pub diving_shooter_bias: f64,
    pub aimed_bullet_speed: f32,
    pub aimed_bullet_speed_per_level: f32,
    pub straight_bullet_speed: f32,
    pub straight_bullet_speed_per_level: f32,
    /// Horizontal aim gain for shots fired by diving enemies
    pub aim_gain: f32,
    /// Muzzle offset below the shooter
    pub muzzle_offset: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            base_dive_interval_ms: 2500.0,
            dive_interval_step_ms: 150.0,
            min_dive_interval_ms: 800.0,
            base_fire_interval_ms: 1500.0,
            fire_interval_step_ms: 100.0,
            min_fire_interval_ms: 500.0,
            dive_speed: 3.0,
            dive_speed_per_level: 0.2,
            dive_progress_step: 0.05,
            wobble_amplitude: 4.0,
            steering_gain: 0.02,
            return_delay_ms: 500.0,
            diving_shooter_bias: 0.7,
            aimed_bullet_speed: 4.0,
            aimed_bullet_speed_per_level: 0.3,
            straight_bullet_speed: 3.0,
            straight_bullet_speed_per_level: 0.2,
            aim_gain: 0.02,
            muzzle_offset: 15.0,
        }
    }
}

/// Collision radii for each tested pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub bullet_enemy: f32,
    pub enemy_player: f32,
    pub enemy_bullet_player: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            bullet_enemy: 20.0,
            enemy_player: 25.0,
            enemy_bullet_player: 15.0,
        }
    }
}

/// Complete tuning for one game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Intro delay before READY turns into PLAYING
    pub ready_delay_ms: f64,
    /// Pause between clearing a stage and the next one starting
    pub level_transition_ms: f64,
    /// Lifetime of enemy and player explosions, in frames
    pub explosion_frames: u32,
    pub player_explosion_frames: u32,
    /// Auto-repeat interval while fire is held
    pub fire_repeat_ms: f64,
    pub player: PlayerConfig,
    pub formation: FormationConfig,
    pub attack: AttackConfig,
    pub collision: CollisionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 480.0,
            canvas_height: 640.0,
            ready_delay_ms: 4000.0,
            level_transition_ms: 3000.0,
            explosion_frames: 20,
            player_explosion_frames: 30,
            fire_repeat_ms: 200.0,
            player: PlayerConfig::default(),
            formation: FormationConfig::default(),
            attack: AttackConfig::default(),
            collision: CollisionConfig::default(),
        }
    }
}

/// Configuration loading/validation failure
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err(ConfigError::Invalid("canvas must have a positive size"));
        }
        if self.formation.cols == 0 {
            return Err(ConfigError::Invalid("formation needs at least one column"));
        }
        if self.formation.spawn_every_ticks == 0 {
            return Err(ConfigError::Invalid("spawn cadence must be at least one tick"));
        }
        if self
            .formation
            .layout
            .iter()
            .any(|row| {
                row.offset
                    .checked_add(row.count)
                    .is_none_or(|end| end > self.formation.cols)
            })
        {
            return Err(ConfigError::Invalid("layout row does not fit the grid"));
        }
        if self.player.max_bullets == 0 || self.player.max_bullets_dual < 2 {
            return Err(ConfigError::Invalid("bullet caps too small"));
        }
        if self.player.initial_lives == 0 {
            return Err(ConfigError::Invalid("a game needs at least one life"));
        }
        if !(0.0..=1.0).contains(&self.attack.diving_shooter_bias) {
            return Err(ConfigError::Invalid("diving shooter bias must be a probability"));
        }
        Ok(())
    }

    /// Number of enemies one wave contains
    pub fn wave_size(&self) -> usize {
        self.formation.layout.iter().map(|row| row.count as usize).sum()
    }
}
