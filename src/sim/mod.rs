//! Simulation module
//!
//! All gameplay logic lives here. The module has no platform or rendering
//! dependencies:
//! - Time arrives as host timestamps through [`FrameTime`]
//! - Randomness comes from the session's seeded RNG
//! - Entities are iterated in spawn order
//! - Delayed effects are generation-stamped schedule entries

pub mod attack;
pub mod collision;
pub mod difficulty;
pub mod formation;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod tick;

pub use collision::{CollisionReport, Destroyed, circles_overlap, resolve_collisions};
pub use difficulty::Difficulty;
pub use formation::{SpawnDescriptor, formation_target, generate_wave};
pub use schedule::{Schedule, TimerKind};
pub use scoring::points_for;
pub use session::GameSession;
pub use snapshot::{ExplosionView, Snapshot};
pub use state::{
    Bullet, Dive, Enemy, EnemyKind, EnemyState, EntityId, Explosion, GameEvent, GamePhase,
    GridCell, Player, PlayerState,
};
pub use store::EntityStore;
pub use tick::{FrameTime, TickInput, tick};
