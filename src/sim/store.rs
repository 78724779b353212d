//! Entity store
//!
//! Sole owner of collection membership. Other systems get slices to
//! mutate entity fields in place; adding and removing goes through the
//! spawn and reap operations here.

use glam::Vec2;

use super::state::{Bullet, Enemy, EnemyKind, EntityId, Explosion, GridCell, Player};

#[derive(Debug, Clone)]
pub struct EntityStore {
    player: Player,
    /// Live enemies (sorted by id)
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    enemy_bullets: Vec<Bullet>,
    explosions: Vec<Explosion>,
    /// Next entity ID (never reused, even across restarts)
    next_id: EntityId,
}

impl EntityStore {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            explosions: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Materialize an enemy in ENTRY state at its formation target
    pub fn spawn_enemy(&mut self, kind: EnemyKind, cell: GridCell, target: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, kind, cell, target));
        id
    }

    pub fn spawn_bullet(&mut self, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.bullets.push(Bullet { id, pos, vel, active: true });
        id
    }

    pub fn spawn_enemy_bullet(&mut self, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.enemy_bullets.push(Bullet { id, pos, vel, active: true });
        id
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, is_player: bool, kind: Option<EnemyKind>) -> EntityId {
        let id = self.next_entity_id();
        self.explosions.push(Explosion { id, pos, frames: 0, is_player, kind });
        id
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut [Bullet] {
        &mut self.bullets
    }

    pub fn enemy_bullets(&self) -> &[Bullet] {
        &self.enemy_bullets
    }

    pub fn enemy_bullets_mut(&mut self) -> &mut [Bullet] {
        &mut self.enemy_bullets
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn explosions_mut(&mut self) -> &mut [Explosion] {
        &mut self.explosions
    }

    /// Player bullets still in flight
    pub fn active_bullet_count(&self) -> usize {
        self.bullets.iter().filter(|b| b.active).count()
    }

    /// Split borrow for collision passes that read the player while
    /// mutating projectiles and enemies
    pub fn combat_view(&mut self) -> CombatView<'_> {
        CombatView {
            player: &self.player,
            enemies: &mut self.enemies,
            bullets: &mut self.bullets,
            enemy_bullets: &mut self.enemy_bullets,
        }
    }

    /// Remove enemies matching `pred`; returns how many were removed
    pub fn reap_enemies(&mut self, pred: impl Fn(&Enemy) -> bool) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| !pred(e));
        before - self.enemies.len()
    }

    pub fn reap_bullets(&mut self, pred: impl Fn(&Bullet) -> bool) -> usize {
        let before = self.bullets.len();
        self.bullets.retain(|b| !pred(b));
        before - self.bullets.len()
    }

    pub fn reap_enemy_bullets(&mut self, pred: impl Fn(&Bullet) -> bool) -> usize {
        let before = self.enemy_bullets.len();
        self.enemy_bullets.retain(|b| !pred(b));
        before - self.enemy_bullets.len()
    }

    pub fn reap_explosions(&mut self, pred: impl Fn(&Explosion) -> bool) -> usize {
        let before = self.explosions.len();
        self.explosions.retain(|x| !pred(x));
        before - self.explosions.len()
    }

    /// Drop every stage entity, keeping the player
    pub fn clear_stage(&mut self) {
        self.enemies.clear();
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.explosions.clear();
    }

    /// Replace the player and drop every stage entity
    pub fn reset(&mut self, player: Player) {
        self.clear_stage();
        self.player = player;
    }
}

/// Disjoint borrows of the store used by collision resolution
pub struct CombatView<'a> {
    pub player: &'a Player,
    pub enemies: &'a mut [Enemy],
    pub bullets: &'a mut [Bullet],
    pub enemy_bullets: &'a mut [Bullet],
}
