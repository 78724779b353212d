//! Collision detection and resolution
//!
//! Everything is a circle: two entities touch when their centers are
//! closer than the pair's threshold. Resolution only marks entities
//! (bullets inactive, enemies dead); the caller reaps them at the end of
//! the tick so nothing is hit twice.

use glam::Vec2;

use super::state::{EnemyKind, EnemyState, EntityId};
use super::store::CombatView;
use crate::tuning::CollisionConfig;

/// An enemy destroyed during this pass
#[derive(Debug, Clone, PartialEq)]
pub struct Destroyed {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// State before it was marked dead (drives the point value)
    pub was_diving: bool,
}

/// Outcome of one collision pass
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    pub destroyed: Vec<Destroyed>,
    /// The player was struck (by a ship or a bullet)
    pub player_hit: bool,
}

/// Strict proximity test: `distance(a, b) < threshold`
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// Test all pairs and mark the results
pub fn resolve_collisions(view: CombatView<'_>, radii: &CollisionConfig) -> CollisionReport {
    let CombatView {
        player,
        enemies,
        bullets,
        enemy_bullets,
    } = view;
    let mut report = CollisionReport::default();

    // Player bullets vs enemies: single use, no pass-through
    for bullet in bullets.iter_mut().filter(|b| b.active) {
        let pos = bullet.pos;
        let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.is_alive() && circles_overlap(pos, e.pos, radii.bullet_enemy))
        else {
            continue;
        };
        bullet.active = false;
        let was_diving = enemy.state() == EnemyState::Diving;
        if enemy.set_state(EnemyState::Dead) {
            report.destroyed.push(Destroyed {
                id: enemy.id,
                kind: enemy.kind,
                pos: enemy.pos,
                was_diving,
            });
        }
    }

    if !player.is_vulnerable() {
        return report;
    }

    // Ramming kills the player; the enemy survives
    report.player_hit = enemies
        .iter()
        .any(|e| e.is_alive() && circles_overlap(e.pos, player.pos, radii.enemy_player));

    if !report.player_hit {
        if let Some(bullet) = enemy_bullets
            .iter_mut()
            .find(|b| b.active && circles_overlap(b.pos, player.pos, radii.enemy_bullet_player))
        {
            bullet.active = false;
            report.player_hit = true;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GridCell, Player, PlayerState};
    use crate::sim::store::EntityStore;
    use crate::tuning::GameConfig;

    fn setup() -> (EntityStore, GameConfig) {
        let config = GameConfig::default();
        let mut store = EntityStore::new(Player::new(&config));
        store.player_mut().pos = Vec2::new(240.0, 590.0);
        (store, config)
    }

    fn spawn_formation_enemy(store: &mut EntityStore, kind: EnemyKind, pos: Vec2) -> EntityId {
        let id = store.spawn_enemy(kind, GridCell { col: 0, row: 0 }, pos);
        store.enemy_mut(id).unwrap().set_state(EnemyState::Formation);
        id
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, Vec2::new(19.9, 0.0), 20.0));
        assert!(!circles_overlap(Vec2::ZERO, Vec2::new(20.0, 0.0), 20.0));
    }

    #[test]
    fn test_bullet_kills_one_enemy_only() {
        let (mut store, config) = setup();
        let a = spawn_formation_enemy(&mut store, EnemyKind::Bee, Vec2::new(100.0, 100.0));
        let b = spawn_formation_enemy(&mut store, EnemyKind::Bee, Vec2::new(105.0, 100.0));
        store.spawn_bullet(Vec2::new(102.0, 102.0), Vec2::new(0.0, -10.0));

        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert_eq!(report.destroyed.len(), 1);
        assert_eq!(report.destroyed[0].id, a);
        assert!(!store.bullets()[0].active);
        assert_eq!(store.enemy(b).unwrap().state(), EnemyState::Formation);
    }

    #[test]
    fn test_diving_flag_read_before_death() {
        let (mut store, config) = setup();
        let id = spawn_formation_enemy(&mut store, EnemyKind::Butterfly, Vec2::new(100.0, 100.0));
        store.enemy_mut(id).unwrap().set_state(EnemyState::Diving);
        store.spawn_bullet(Vec2::new(100.0, 100.0), Vec2::ZERO);

        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert!(report.destroyed[0].was_diving);
        assert_eq!(store.enemy(id).unwrap().state(), EnemyState::Dead);
    }

    #[test]
    fn test_dead_enemy_not_hit_twice() {
        let (mut store, config) = setup();
        spawn_formation_enemy(&mut store, EnemyKind::Boss, Vec2::new(100.0, 100.0));
        store.spawn_bullet(Vec2::new(100.0, 100.0), Vec2::ZERO);
        store.spawn_bullet(Vec2::new(101.0, 100.0), Vec2::ZERO);

        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert_eq!(report.destroyed.len(), 1);
        assert_eq!(store.active_bullet_count(), 1);
    }

    #[test]
    fn test_ramming_kills_player_not_enemy() {
        let (mut store, config) = setup();
        let pos = store.player().pos;
        let id = spawn_formation_enemy(&mut store, EnemyKind::Bee, pos + Vec2::new(10.0, 0.0));

        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert!(report.player_hit);
        assert!(store.enemy(id).unwrap().is_alive());
    }

    #[test]
    fn test_enemy_bullet_consumed_on_hit() {
        let (mut store, config) = setup();
        let pos = store.player().pos;
        store.spawn_enemy_bullet(pos, Vec2::new(0.0, 4.0));

        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert!(report.player_hit);
        assert!(!store.enemy_bullets()[0].active);
    }

    #[test]
    fn test_invincible_or_exploding_player_ignored() {
        let (mut store, config) = setup();
        let pos = store.player().pos;
        spawn_formation_enemy(&mut store, EnemyKind::Bee, pos);
        store.spawn_enemy_bullet(pos, Vec2::ZERO);

        store.player_mut().invincible_until_ms = Some(3000.0);
        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert!(!report.player_hit);
        assert!(store.enemy_bullets()[0].active);

        store.player_mut().invincible_until_ms = None;
        store.player_mut().state = PlayerState::Exploding;
        let report = resolve_collisions(store.combat_view(), &config.collision);
        assert!(!report.player_hit);
    }
}
