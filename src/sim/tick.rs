//! Per-frame simulation step
//!
//! Order inside a playing tick: timers, player, bullets, spawning,
//! attack selection, enemy motion, enemy bullets, collisions, scoring,
//! reaping, stage-clear check. Reaping comes last so every system sees
//! the same entities.

use glam::Vec2;

use super::attack::{advance_dive, begin_dive, pick_diver, pick_shot};
use super::collision::resolve_collisions;
use super::formation::{breathing_x, formation_target};
use super::schedule::TimerKind;
use super::scoring::points_for;
use super::session::GameSession;
use super::state::{EnemyState, GameEvent, GamePhase, PlayerState};
use crate::consts::OFFSCREEN_MARGIN;
use crate::frame_scale;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Movement intent (held)
    pub left: bool,
    pub right: bool,
    /// Fire request (press edge or auto-repeat)
    pub fire: bool,
    /// Start from the menu / leave the game-over screen
    pub confirm: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Timing of one display frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Host timestamp in milliseconds
    pub now_ms: f64,
    /// Time since the previous processed frame
    pub dt_ms: f64,
}

impl FrameTime {
    pub fn new(now_ms: f64, dt_ms: f64) -> Self {
        Self { now_ms, dt_ms }
    }
}

/// Advance the session by one frame
pub fn tick(session: &mut GameSession, input: &TickInput, frame: FrameTime) {
    if input.pause {
        session.toggle_pause();
    }

    // Paused: render continues, logic does not
    if session.paused {
        return;
    }

    if input.confirm {
        match session.phase {
            GamePhase::Menu => {
                session.start_game(frame.now_ms);
            }
            GamePhase::GameOver => session.restart_game(),
            _ => {}
        }
    }

    session.now_ms = frame.now_ms;
    session.tick_count += 1;
    let scale = frame_scale(frame.dt_ms);

    session.run_timers();
    session.age_explosions();

    if session.phase != GamePhase::Playing {
        return;
    }

    session.move_player(input, scale);
    if input.fire {
        session.try_fire(frame.now_ms);
    }
    session.move_bullets(scale);
    session.spawn_next();
    session.trigger_dive();
    session.trigger_enemy_fire();
    session.move_enemies(scale);
    session.move_enemy_bullets(scale);
    session.resolve_combat();
    session.reap();
    session.check_stage_clear();
}

impl GameSession {
    fn age_explosions(&mut self) {
        let config = &self.config;
        for explosion in self.store.explosions_mut() {
            explosion.frames += 1;
        }
        self.store.reap_explosions(|x| x.frames > x.lifetime(config));
    }

    fn move_player(&mut self, input: &TickInput, scale: f32) {
        let margin = self.config.player.edge_margin;
        let max_x = self.config.canvas_width - margin;
        let player = self.store.player_mut();
        if player.state != PlayerState::Alive {
            return;
        }
        let mut dx = 0.0;
        if input.left {
            dx -= player.speed;
        }
        if input.right {
            dx += player.speed;
        }
        player.pos.x = (player.pos.x + dx * scale).clamp(margin, max_x.max(margin));
    }

    fn move_bullets(&mut self, scale: f32) {
        for bullet in self.store.bullets_mut() {
            bullet.pos += bullet.vel * scale;
            if bullet.pos.y <= -OFFSCREEN_MARGIN {
                bullet.active = false;
            }
        }
    }

    /// Materialize one queued enemy every `spawn_every_ticks` ticks
    fn spawn_next(&mut self) {
        if self.tick_count % self.config.formation.spawn_every_ticks != 0 {
            return;
        }
        let Some(descriptor) = self.spawn_queue.pop_front() else {
            return;
        };
        let target = formation_target(
            descriptor.cell,
            &self.config.formation,
            self.config.canvas_width,
        );
        let id = self.store.spawn_enemy(descriptor.kind, descriptor.cell, target);
        // No flight-in path: entry completes immediately
        if let Some(enemy) = self.store.enemy_mut(id) {
            enemy.set_state(EnemyState::Formation);
        }
        log::trace!("Spawned {} #{} at {:?}", descriptor.kind.as_str(), id, target);
    }

    fn trigger_dive(&mut self) {
        if self.now_ms - self.last_dive_ms <= self.difficulty.dive_interval_ms {
            return;
        }
        let Some(id) = pick_diver(self.store.enemies(), &mut self.rng) else {
            return;
        };
        let player_x = self.store.player().pos.x;
        if let Some(enemy) = self.store.enemy_mut(id) {
            if begin_dive(enemy, player_x) {
                self.events.push(GameEvent::EnemyDive { id });
                log::debug!("{} #{} dives", enemy.kind.as_str(), id);
            }
        }
        self.last_dive_ms = self.now_ms;
    }

    fn trigger_enemy_fire(&mut self) {
        if self.now_ms - self.last_enemy_shot_ms <= self.difficulty.enemy_fire_interval_ms {
            return;
        }
        let player_x = self.store.player().pos.x;
        if let Some(shot) = pick_shot(
            self.store.enemies(),
            player_x,
            &self.difficulty,
            &self.config.attack,
            &mut self.rng,
        ) {
            self.store.spawn_enemy_bullet(shot.origin, shot.vel);
        }
        self.last_enemy_shot_ms = self.now_ms;
    }

    fn move_enemies(&mut self, scale: f32) {
        let elapsed_secs = self.now_ms * 0.001;
        let player_x = self.store.player().pos.x;
        let canvas_height = self.config.canvas_height;
        let mut wrapped = Vec::new();

        for enemy in self.store.enemies_mut() {
            match enemy.state() {
                EnemyState::Formation => {
                    enemy.pos.x = breathing_x(enemy.target.x, elapsed_secs, &self.config.formation);
                    enemy.pos.y = enemy.target.y;
                }
                EnemyState::Diving => {
                    if advance_dive(
                        enemy,
                        player_x,
                        &self.difficulty,
                        &self.config.attack,
                        canvas_height,
                        scale,
                    ) {
                        wrapped.push(enemy.id);
                    }
                }
                EnemyState::Entry | EnemyState::Dead => {}
            }
        }

        let due = self.now_ms + self.config.attack.return_delay_ms;
        for id in wrapped {
            self.schedule
                .schedule(self.generation, due, TimerKind::RejoinFormation { enemy: id });
        }
    }

    fn move_enemy_bullets(&mut self, scale: f32) {
        let width = self.config.canvas_width;
        let height = self.config.canvas_height;
        for bullet in self.store.enemy_bullets_mut() {
            bullet.pos += bullet.vel * scale;
            let Vec2 { x, y } = bullet.pos;
            if y >= height + OFFSCREEN_MARGIN || x <= -OFFSCREEN_MARGIN || x >= width + OFFSCREEN_MARGIN {
                bullet.active = false;
            }
        }
    }

    fn resolve_combat(&mut self) {
        let report = resolve_collisions(self.store.combat_view(), &self.config.collision);

        for hit in report.destroyed {
            let points = points_for(hit.kind, hit.was_diving, 0);
            self.add_score(points);
            self.store.spawn_explosion(hit.pos, false, Some(hit.kind));
            self.events.push(GameEvent::EnemyDestroyed {
                kind: hit.kind,
                points,
                was_diving: hit.was_diving,
            });
        }

        if report.player_hit {
            self.kill_player(self.now_ms);
        }
    }

    fn reap(&mut self) {
        self.store.reap_bullets(|b| !b.active);
        self.store.reap_enemy_bullets(|b| !b.active);
        self.store.reap_enemies(|e| !e.is_alive());
    }

    fn check_stage_clear(&mut self) {
        if !self.store.enemies().is_empty() || !self.spawn_queue.is_empty() {
            return;
        }
        self.phase = GamePhase::LevelTransition;
        self.schedule.schedule(
            self.generation,
            self.now_ms + self.config.level_transition_ms,
            TimerKind::AdvanceLevel,
        );
        self.events.push(GameEvent::LevelClear { level: self.level });
        log::info!("Level {} cleared ({} points)", self.level, self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::tuning::GameConfig;

    fn playing_session() -> (GameSession, f64) {
        let mut session = GameSession::new(GameConfig::default(), 12345, 0);
        session.start_game(0.0);
        let now = session.config().ready_delay_ms;
        tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        assert_eq!(session.phase(), GamePhase::Playing);
        (session, now)
    }

    #[test]
    fn test_menu_to_ready_to_playing() {
        let mut session = GameSession::new(GameConfig::default(), 1, 0);
        let confirm = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut session, &confirm, FrameTime::new(0.0, FRAME_MS));
        assert_eq!(session.phase(), GamePhase::Ready);

        tick(&mut session, &TickInput::default(), FrameTime::new(3999.0, FRAME_MS));
        assert_eq!(session.phase(), GamePhase::Ready);
        // Nothing spawns before play begins
        assert!(session.store().enemies().is_empty());

        tick(&mut session, &TickInput::default(), FrameTime::new(4000.0, FRAME_MS));
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_pause_suppresses_update() {
        let (mut session, mut now) = playing_session();
        let ticks = session.tick_count();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut session, &pause, FrameTime::new(now, FRAME_MS));
        assert!(session.is_paused());
        for _ in 0..20 {
            now += FRAME_MS;
            tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        }
        assert_eq!(session.tick_count(), ticks);

        tick(&mut session, &pause, FrameTime::new(now, FRAME_MS));
        assert!(!session.is_paused());
        assert_eq!(session.tick_count(), ticks + 1);
    }

    #[test]
    fn test_spawn_cadence() {
        let (mut session, mut now) = playing_session();
        let before = session.pending_spawns();
        for _ in 0..100 {
            now += FRAME_MS;
            tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        }
        let spawned = before - session.pending_spawns();
        assert_eq!(spawned, 10);
        assert!(session
            .store()
            .enemies()
            .iter()
            .all(|e| e.state() != EnemyState::Entry));
    }

    #[test]
    fn test_player_clamped_to_playfield() {
        let (mut session, mut now) = playing_session();
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..200 {
            now += FRAME_MS;
            tick(&mut session, &left, FrameTime::new(now, FRAME_MS));
            if session.player().state != PlayerState::Alive {
                break;
            }
        }
        assert!(session.player().pos.x >= session.config().player.edge_margin);
    }

    #[test]
    fn test_move_speed_scales_with_frame_time() {
        let (mut session, now) = playing_session();
        let start = session.player().pos.x;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut session, &right, FrameTime::new(now + 2.0 * FRAME_MS, 2.0 * FRAME_MS));
        assert!((session.player().pos.x - start - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_bullet_leaves_top_and_is_reaped() {
        let (mut session, mut now) = playing_session();
        assert!(session.try_fire(now));
        assert_eq!(session.store().bullets().len(), 1);
        // 580px at 10px per frame
        for _ in 0..70 {
            now += FRAME_MS;
            tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        }
        assert!(session.store().bullets().is_empty());
    }

    #[test]
    fn test_enemy_bullets_pruned_off_screen() {
        let (mut session, mut now) = playing_session();
        session.store.spawn_enemy_bullet(Vec2::new(-50.0, 100.0), Vec2::new(0.0, 4.0));
        session.store.spawn_enemy_bullet(Vec2::new(100.0, 10_000.0), Vec2::new(0.0, 4.0));
        now += FRAME_MS;
        tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        assert!(session.store().enemy_bullets().is_empty());
    }

    #[test]
    fn test_dives_respect_interval() {
        let (mut session, mut now) = playing_session();
        let dive_interval = session.difficulty().dive_interval_ms;
        let mut dive_times = Vec::new();
        for _ in 0..600 {
            now += FRAME_MS;
            tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
            if session.phase() != GamePhase::Playing {
                break;
            }
            let dived = session
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyDive { .. }));
            if dived {
                dive_times.push(now);
            }
        }
        assert!(dive_times.len() >= 2);
        for pair in dive_times.windows(2) {
            assert!(pair[1] - pair[0] > dive_interval);
        }
    }

    #[test]
    fn test_explosions_expire() {
        let (mut session, mut now) = playing_session();
        session.store.spawn_explosion(Vec2::new(10.0, 10.0), false, None);
        for _ in 0..session.config().explosion_frames {
            now += FRAME_MS;
            tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        }
        assert_eq!(session.store().explosions().len(), 1);
        now += FRAME_MS;
        tick(&mut session, &TickInput::default(), FrameTime::new(now, FRAME_MS));
        assert!(session.store().explosions().is_empty());
    }
}
