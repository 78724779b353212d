//! Enemy attack behavior: dive selection, dive paths and enemy fire

use glam::Vec2;
use rand::Rng;

use super::difficulty::Difficulty;
use super::state::{Dive, Enemy, EnemyState, EntityId};
use crate::consts::REENTRY_Y;
use crate::tuning::AttackConfig;

/// Choose a diver uniformly among enemies holding formation
pub fn pick_diver<R: Rng + ?Sized>(enemies: &[Enemy], rng: &mut R) -> Option<EntityId> {
    let candidates: Vec<EntityId> = enemies
        .iter()
        .filter(|e| e.state() == EnemyState::Formation)
        .map(|e| e.id)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Put a formation enemy on an attack run toward `player_x`
pub fn begin_dive(enemy: &mut Enemy, player_x: f32) -> bool {
    if !enemy.set_state(EnemyState::Diving) {
        return false;
    }
    enemy.dive = Some(Dive {
        elapsed: 0.0,
        start: enemy.pos,
        target_x: player_x,
        returning: false,
    });
    true
}

/// Advance a diver by one frame.
///
/// Returns true on the frame the diver leaves the bottom of the playfield
/// and is moved back above the top; the caller schedules its return to
/// formation. A returning diver glides down to its slot height.
pub fn advance_dive(
    enemy: &mut Enemy,
    player_x: f32,
    difficulty: &Difficulty,
    attack: &AttackConfig,
    canvas_height: f32,
    scale: f32,
) -> bool {
    let target = enemy.target;
    let Some(dive) = enemy.dive.as_mut() else {
        return false;
    };

    if dive.returning {
        enemy.pos.x = target.x;
        enemy.pos.y = (enemy.pos.y + difficulty.dive_speed * scale).min(target.y);
        return false;
    }

    dive.elapsed += attack.dive_progress_step * scale;
    dive.target_x = player_x;
    enemy.pos.y += difficulty.dive_speed * scale;
    let wobble = (dive.elapsed * 2.0).sin() * attack.wobble_amplitude;
    let steer = (dive.target_x - enemy.pos.x) * attack.steering_gain;
    enemy.pos.x += (wobble + steer) * scale;

    if enemy.pos.y > canvas_height {
        enemy.pos = Vec2::new(target.x, REENTRY_Y);
        dive.returning = true;
        return true;
    }
    false
}

/// An enemy shot about to be spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub shooter: EntityId,
    pub origin: Vec2,
    pub vel: Vec2,
}

/// Choose at most one shooter. Divers are preferred with probability
/// `diving_shooter_bias` and aim at the player; formation shooters fire
/// straight down.
pub fn pick_shot<R: Rng + ?Sized>(
    enemies: &[Enemy],
    player_x: f32,
    difficulty: &Difficulty,
    attack: &AttackConfig,
    rng: &mut R,
) -> Option<Shot> {
    let divers: Vec<&Enemy> = enemies
        .iter()
        .filter(|e| e.state() == EnemyState::Diving)
        .collect();
    if !divers.is_empty() && rng.random::<f64>() < attack.diving_shooter_bias {
        let shooter = divers[rng.random_range(0..divers.len())];
        return Some(Shot {
            shooter: shooter.id,
            origin: shooter.pos + Vec2::new(0.0, attack.muzzle_offset),
            vel: Vec2::new(
                (player_x - shooter.pos.x) * attack.aim_gain,
                difficulty.aimed_bullet_speed,
            ),
        });
    }

    let formation: Vec<&Enemy> = enemies
        .iter()
        .filter(|e| e.state() == EnemyState::Formation)
        .collect();
    if formation.is_empty() {
        return None;
    }
    let shooter = formation[rng.random_range(0..formation.len())];
    Some(Shot {
        shooter: shooter.id,
        origin: shooter.pos + Vec2::new(0.0, attack.muzzle_offset),
        vel: Vec2::new(0.0, difficulty.straight_bullet_speed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EnemyKind, GridCell};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn formation_enemy(id: EntityId, pos: Vec2) -> Enemy {
        let mut enemy = Enemy::new(id, EnemyKind::Bee, GridCell { col: 0, row: 3 }, pos);
        enemy.set_state(EnemyState::Formation);
        enemy
    }

    #[test]
    fn test_pick_diver_only_from_formation() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemies = vec![
            formation_enemy(1, Vec2::new(100.0, 60.0)),
            formation_enemy(2, Vec2::new(132.0, 60.0)),
        ];
        begin_dive(&mut enemies[0], 240.0);
        for _ in 0..50 {
            assert_eq!(pick_diver(&enemies, &mut rng), Some(2));
        }
        begin_dive(&mut enemies[1], 240.0);
        assert_eq!(pick_diver(&enemies, &mut rng), None);
    }

    #[test]
    fn test_dive_moves_down_and_steers() {
        let attack = AttackConfig::default();
        let difficulty = Difficulty::for_level(1, &attack);
        let mut enemy = formation_enemy(1, Vec2::new(100.0, 60.0));
        begin_dive(&mut enemy, 300.0);

        let start = enemy.pos;
        for _ in 0..30 {
            assert!(!advance_dive(&mut enemy, 300.0, &difficulty, &attack, 640.0, 1.0));
        }
        assert!(enemy.pos.y > start.y);
        assert!(enemy.pos.x > start.x, "diver should drift toward the player");
        assert_eq!(enemy.dive.unwrap().start, start);
    }

    #[test]
    fn test_dive_wraps_to_top_and_glides_back() {
        let attack = AttackConfig::default();
        let difficulty = Difficulty::for_level(1, &attack);
        let mut enemy = formation_enemy(1, Vec2::new(100.0, 60.0));
        begin_dive(&mut enemy, 100.0);
        enemy.pos.y = 639.0;

        assert!(advance_dive(&mut enemy, 100.0, &difficulty, &attack, 640.0, 1.0));
        assert_eq!(enemy.pos, Vec2::new(100.0, REENTRY_Y));
        assert_eq!(enemy.state(), EnemyState::Diving);

        // Returning divers never wrap again and stop at slot height
        for _ in 0..200 {
            assert!(!advance_dive(&mut enemy, 400.0, &difficulty, &attack, 640.0, 1.0));
        }
        assert_eq!(enemy.pos, enemy.target);
    }

    #[test]
    fn test_formation_shot_is_straight_down() {
        let attack = AttackConfig {
            diving_shooter_bias: 0.0,
            ..AttackConfig::default()
        };
        let difficulty = Difficulty::for_level(1, &attack);
        let enemies = vec![formation_enemy(5, Vec2::new(100.0, 60.0))];
        let mut rng = Pcg32::seed_from_u64(3);
        let shot = pick_shot(&enemies, 400.0, &difficulty, &attack, &mut rng).unwrap();
        assert_eq!(shot.shooter, 5);
        assert_eq!(shot.vel.x, 0.0);
        assert_eq!(shot.origin, Vec2::new(100.0, 75.0));
    }

    #[test]
    fn test_diver_shot_aims_at_player() {
        let attack = AttackConfig {
            diving_shooter_bias: 1.0,
            ..AttackConfig::default()
        };
        let difficulty = Difficulty::for_level(2, &attack);
        let mut enemies = vec![formation_enemy(5, Vec2::new(100.0, 300.0))];
        begin_dive(&mut enemies[0], 400.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let shot = pick_shot(&enemies, 400.0, &difficulty, &attack, &mut rng).unwrap();
        assert!((shot.vel.x - 6.0).abs() < 1e-4);
        assert!((shot.vel.y - difficulty.aimed_bullet_speed).abs() < 1e-6);
    }

    #[test]
    fn test_no_shooters_no_shot() {
        let attack = AttackConfig::default();
        let difficulty = Difficulty::for_level(1, &attack);
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(pick_shot(&[], 0.0, &difficulty, &attack, &mut rng).is_none());
    }
}
