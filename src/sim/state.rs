//! Entity and phase types
//!
//! Plain data for everything the simulation owns. Behavior lives in the
//! other `sim` modules; the only logic here guards lifecycle transitions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::GameConfig;

/// Entity identifier, unique for the lifetime of a session object
pub type EntityId = u32;

/// Top-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for the start action
    Menu,
    /// Intro delay before the first stage becomes playable
    Ready,
    /// Active gameplay
    Playing,
    /// Stage cleared, next stage pending
    LevelTransition,
    /// Run ended
    GameOver,
}

/// Player lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Alive,
    /// Destroyed, waiting for the respawn timer
    Exploding,
    /// Held by a boss tractor beam (reserved, never entered by the core)
    Captured,
}

/// The player's fighter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Pixels per frame at 60 fps
    pub speed: f32,
    /// Timestamp of the last accepted volley
    pub last_fire_ms: Option<f64>,
    pub lives: u32,
    /// Fitted with a second gun (rescued fighter)
    pub is_dual: bool,
    /// Invincible until this timestamp, if set
    pub invincible_until_ms: Option<f64>,
    pub state: PlayerState,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pos: Self::home_position(config),
            speed: config.player.speed,
            last_fire_ms: None,
            lives: config.player.initial_lives,
            is_dual: false,
            invincible_until_ms: None,
            state: PlayerState::Alive,
        }
    }

    /// Horizontally centered, just above the bottom edge
    pub fn home_position(config: &GameConfig) -> Vec2 {
        Vec2::new(
            config.canvas_width / 2.0,
            config.canvas_height - config.player.bottom_offset,
        )
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_until_ms.is_some()
    }

    /// Remaining invincibility at `now_ms` (zero when not invincible)
    pub fn invincibility_remaining_ms(&self, now_ms: f64) -> f64 {
        self.invincible_until_ms
            .map(|until| (until - now_ms).max(0.0))
            .unwrap_or(0.0)
    }

    /// Alive and not shielded by a respawn window
    pub fn is_vulnerable(&self) -> bool {
        self.state == PlayerState::Alive && !self.is_invincible()
    }

    /// Active bullet cap for the current gun setup
    pub fn max_bullets(&self, config: &GameConfig) -> usize {
        if self.is_dual {
            config.player.max_bullets_dual
        } else {
            config.player.max_bullets
        }
    }
}

/// Enemy variant. Only selects the scoring row and the sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Bee,
    Butterfly,
    Boss,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Bee => "bee",
            EnemyKind::Butterfly => "butterfly",
            EnemyKind::Boss => "boss",
        }
    }
}

/// Enemy behavioral state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Entry,
    Formation,
    Diving,
    Dead,
}

impl EnemyState {
    /// ENTRY -> FORMATION -> {DIVING <-> FORMATION} -> DEAD
    pub fn can_transition_to(self, next: EnemyState) -> bool {
        use EnemyState::*;
        matches!(
            (self, next),
            (Entry, Formation)
                | (Formation, Diving)
                | (Diving, Formation)
                | (Entry, Dead)
                | (Formation, Dead)
                | (Diving, Dead)
        )
    }
}

/// Formation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

/// Transient data of an attack run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dive {
    /// Progress accumulator driving the wobble phase
    pub elapsed: f32,
    pub start: Vec2,
    /// Horizontal point the diver steers toward (tracks the player)
    pub target_x: f32,
    /// Wrapped past the bottom and gliding back to the slot
    pub returning: bool,
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub cell: GridCell,
    pub pos: Vec2,
    /// Formation slot position (before breathing)
    pub target: Vec2,
    state: EnemyState,
    pub dive: Option<Dive>,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, cell: GridCell, target: Vec2) -> Self {
        Self {
            id,
            kind,
            cell,
            pos: target,
            target,
            state: EnemyState::Entry,
            dive: None,
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Move to `next` if the lifecycle allows it
    pub fn set_state(&mut self, next: EnemyState) -> bool {
        if !self.state.can_transition_to(next) {
            log::warn!(
                "Enemy {} refused transition {:?} -> {:?}",
                self.id,
                self.state,
                next
            );
            return false;
        }
        self.state = next;
        if next != EnemyState::Diving {
            self.dive = None;
        }
        true
    }

    pub fn is_alive(&self) -> bool {
        self.state != EnemyState::Dead
    }
}

/// A projectile; used for both player and enemy shots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec2,
    /// Pixels per frame at 60 fps
    pub vel: Vec2,
    pub active: bool,
}

/// A short-lived destruction effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec2,
    /// Frames elapsed since creation
    pub frames: u32,
    pub is_player: bool,
    /// Enemy kind that exploded (None for the player)
    pub kind: Option<EnemyKind>,
}

impl Explosion {
    /// Frames before the explosion removes itself
    pub fn lifetime(&self, config: &GameConfig) -> u32 {
        if self.is_player {
            config.player_explosion_frames
        } else {
            config.explosion_frames
        }
    }

    /// Render radius: starts at 8px and grows faster for the player
    pub fn radius(&self, config: &GameConfig) -> f32 {
        let progress = self.frames as f32 / self.lifetime(config).max(1) as f32;
        let growth = if self.is_player { 40.0 } else { 24.0 };
        8.0 + progress.min(1.0) * growth
    }
}

/// Notable things that happened during a tick; consumed by audio/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStart,
    StagePlayable { level: u32 },
    PlayerShot,
    EnemyDive { id: EntityId },
    EnemyDestroyed { kind: EnemyKind, points: u64, was_diving: bool },
    PlayerDeath,
    PlayerRespawn,
    ExtraLife { lives: u32 },
    LevelClear { level: u32 },
    GameOver { score: u64, level: u32, new_high_score: bool },
    ScoreRanked { rank: usize, is_personal_best: bool },
}
