//! Point table
//!
//! Values follow the 1981 arcade table. Diving kills are always worth
//! more than formation kills of the same kind.

use super::state::EnemyKind;

pub const BEE_FORMATION: u64 = 50;
pub const BEE_DIVING: u64 = 100;
pub const BUTTERFLY_FORMATION: u64 = 80;
pub const BUTTERFLY_DIVING: u64 = 160;
pub const BOSS_FORMATION: u64 = 150;
pub const BOSS_DIVING_ALONE: u64 = 400;
pub const BOSS_DIVING_ONE_ESCORT: u64 = 800;
pub const BOSS_DIVING_TWO_ESCORTS: u64 = 1600;

/// Points for destroying an enemy of `kind`.
///
/// `was_diving` must be read before the enemy is marked dead. `escorts`
/// only matters for a diving boss; escort formations are not generated
/// by the core yet, so callers currently pass 0.
pub fn points_for(kind: EnemyKind, was_diving: bool, escorts: u8) -> u64 {
    match (kind, was_diving) {
        (EnemyKind::Bee, false) => BEE_FORMATION,
        (EnemyKind::Bee, true) => BEE_DIVING,
        (EnemyKind::Butterfly, false) => BUTTERFLY_FORMATION,
        (EnemyKind::Butterfly, true) => BUTTERFLY_DIVING,
        (EnemyKind::Boss, false) => BOSS_FORMATION,
        (EnemyKind::Boss, true) => match escorts {
            0 => BOSS_DIVING_ALONE,
            1 => BOSS_DIVING_ONE_ESCORT,
            _ => BOSS_DIVING_TWO_ESCORTS,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diving_worth_more() {
        for kind in [EnemyKind::Bee, EnemyKind::Butterfly, EnemyKind::Boss] {
            assert!(points_for(kind, true, 0) > points_for(kind, false, 0));
        }
        assert_eq!(points_for(EnemyKind::Bee, false, 0), 50);
        assert_eq!(points_for(EnemyKind::Bee, true, 0), 100);
        assert_eq!(points_for(EnemyKind::Butterfly, false, 0), 80);
        assert_eq!(points_for(EnemyKind::Butterfly, true, 0), 160);
    }

    #[test]
    fn test_boss_escort_tiers() {
        assert_eq!(points_for(EnemyKind::Boss, false, 2), 150);
        assert_eq!(points_for(EnemyKind::Boss, true, 0), 400);
        assert_eq!(points_for(EnemyKind::Boss, true, 1), 800);
        assert_eq!(points_for(EnemyKind::Boss, true, 2), 1600);
        assert_eq!(points_for(EnemyKind::Boss, true, 9), 1600);
    }
}
