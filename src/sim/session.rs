//! Game session and state machine
//!
//! One `GameSession` value holds everything a run needs. The host loop
//! owns it and threads it through [`super::tick`]; tests build a fresh one
//! each time.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::difficulty::Difficulty;
use super::formation::{SpawnDescriptor, breathing_x, generate_wave};
use super::schedule::{Schedule, TimerKind};
use super::state::{EnemyState, GameEvent, GamePhase, Player, PlayerState};
use super::store::EntityStore;
use crate::leaderboard::{ScoreSubmission, SubmitOutcome};
use crate::tuning::GameConfig;

#[derive(Debug, Clone)]
pub struct GameSession {
    pub(super) config: GameConfig,
    pub(super) phase: GamePhase,
    pub(super) paused: bool,
    /// Current level (1-based)
    pub(super) level: u32,
    pub(super) score: u64,
    /// Best score known locally (max of stored value and finished runs)
    pub(super) high_score: u64,
    /// Bumped on every start/restart; stamps timers and submissions
    pub(super) generation: u64,
    /// Update ticks since the session was created
    pub(super) tick_count: u64,
    /// Timestamp of the latest update
    pub(super) now_ms: f64,
    pub(super) store: EntityStore,
    pub(super) spawn_queue: VecDeque<SpawnDescriptor>,
    pub(super) difficulty: Difficulty,
    pub(super) last_dive_ms: f64,
    pub(super) last_enemy_shot_ms: f64,
    pub(super) schedule: Schedule,
    pub(super) rng: Pcg32,
    pub(super) events: Vec<GameEvent>,
    submissions: Vec<ScoreSubmission>,
    last_submission: Option<SubmitOutcome>,
    username: Option<String>,
    /// Index of the next bonus-life threshold not yet reached
    pub(super) next_bonus: usize,
}

impl GameSession {
    /// Create a session sitting at the menu
    pub fn new(config: GameConfig, seed: u64, high_score: u64) -> Self {
        let difficulty = Difficulty::for_level(1, &config.attack);
        let player = Player::new(&config);
        Self {
            phase: GamePhase::Menu,
            paused: false,
            level: 1,
            score: 0,
            high_score,
            generation: 0,
            tick_count: 0,
            now_ms: 0.0,
            store: EntityStore::new(player),
            spawn_queue: VecDeque::new(),
            difficulty,
            last_dive_ms: 0.0,
            last_enemy_shot_ms: 0.0,
            schedule: Schedule::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            submissions: Vec::new(),
            last_submission: None,
            username: None,
            next_bonus: 0,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn player(&self) -> &Player {
        self.store.player()
    }

    /// Mutable player access for hosts that grant upgrades (dual fighter)
    pub fn player_mut(&mut self) -> &mut Player {
        self.store.player_mut()
    }

    /// Descriptors still waiting to be spawned this stage
    pub fn pending_spawns(&self) -> usize {
        self.spawn_queue.len()
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Replace the random source (tests use this for determinism)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Score submissions queued by game over; the host sends them outside
    /// the tick and reports back through [`Self::resolve_submission`]
    pub fn take_submissions(&mut self) -> Vec<ScoreSubmission> {
        std::mem::take(&mut self.submissions)
    }

    /// Result of the latest submission of this run, once resolved
    pub fn last_submission(&self) -> Option<&SubmitOutcome> {
        self.last_submission.as_ref()
    }

    /// Apply a leaderboard result. Results for an earlier run are ignored.
    pub fn resolve_submission(&mut self, generation: u64, outcome: SubmitOutcome) -> bool {
        if generation != self.generation {
            log::debug!(
                "Ignoring leaderboard result for run {} (current run {})",
                generation,
                self.generation
            );
            return false;
        }
        if let (true, Some(rank)) = (outcome.success, outcome.rank) {
            self.events.push(GameEvent::ScoreRanked {
                rank,
                is_personal_best: outcome.is_personal_best.unwrap_or(false),
            });
        }
        self.last_submission = Some(outcome);
        true
    }

    /// MENU (or GAME_OVER) -> READY: fresh run at level 1
    pub fn start_game(&mut self, now_ms: f64) -> bool {
        if !matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
            return false;
        }
        self.generation += 1;
        self.now_ms = now_ms;
        self.phase = GamePhase::Ready;
        self.paused = false;
        self.level = 1;
        self.score = 0;
        self.next_bonus = 0;
        self.last_submission = None;
        self.difficulty = Difficulty::for_level(self.level, &self.config.attack);
        self.store.reset(Player::new(&self.config));
        self.reset_level(now_ms);
        self.schedule.schedule(
            self.generation,
            now_ms + self.config.ready_delay_ms,
            TimerKind::BeginPlay,
        );
        self.events.push(GameEvent::GameStart);
        log::info!("Run {} started", self.generation);
        true
    }

    /// Back to the menu from anywhere. Timers from the abandoned run become
    /// stale and will be discarded.
    pub fn restart_game(&mut self) {
        self.generation += 1;
        self.phase = GamePhase::Menu;
        self.paused = false;
        self.level = 1;
        self.score = 0;
        self.next_bonus = 0;
        self.last_submission = None;
        self.difficulty = Difficulty::for_level(1, &self.config.attack);
        self.store.reset(Player::new(&self.config));
        self.spawn_queue.clear();
        log::info!("Returned to menu (run {})", self.generation);
    }

    /// Flip the pause flag; only meaningful while a run is in progress
    pub fn toggle_pause(&mut self) -> bool {
        if matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
            return false;
        }
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        true
    }

    /// Clear the stage and queue a fresh wave
    fn reset_level(&mut self, now_ms: f64) {
        self.store.clear_stage();
        self.spawn_queue = generate_wave(&self.config.formation.layout);
        self.last_dive_ms = now_ms;
        self.last_enemy_shot_ms = now_ms;
        log::info!(
            "Level {}: {} enemies queued, dive every {}ms, fire every {}ms",
            self.level,
            self.spawn_queue.len(),
            self.difficulty.dive_interval_ms,
            self.difficulty.enemy_fire_interval_ms
        );
    }

    /// Fire a volley if the cooldown and bullet cap allow it
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if self.phase != GamePhase::Playing || self.paused {
            return false;
        }
        let player = self.store.player();
        if player.state != PlayerState::Alive {
            return false;
        }
        let volley = if player.is_dual { 2 } else { 1 };
        if self.store.active_bullet_count() + volley > player.max_bullets(&self.config) {
            return false;
        }
        if let Some(last) = player.last_fire_ms {
            if now_ms - last <= self.config.player.fire_cooldown_ms {
                return false;
            }
        }

        let muzzle = player.pos - Vec2::new(0.0, self.config.player.muzzle_offset);
        let is_dual = player.is_dual;
        let vel = Vec2::new(0.0, -self.config.player.bullet_speed);
        if is_dual {
            let spread = Vec2::new(self.config.player.dual_spread, 0.0);
            self.store.spawn_bullet(muzzle - spread, vel);
            self.store.spawn_bullet(muzzle + spread, vel);
        } else {
            self.store.spawn_bullet(muzzle, vel);
        }
        self.store.player_mut().last_fire_ms = Some(now_ms);
        self.events.push(GameEvent::PlayerShot);
        true
    }

    /// Destroy the player; the life is deducted when the death timer fires
    pub fn kill_player(&mut self, now_ms: f64) -> bool {
        if self.store.player().state != PlayerState::Alive {
            return false;
        }
        let pos = self.store.player().pos;
        self.store.player_mut().state = PlayerState::Exploding;
        self.store.spawn_explosion(pos, true, None);
        self.schedule.schedule(
            self.generation,
            now_ms + self.config.player.respawn_delay_ms,
            TimerKind::ResolvePlayerDeath,
        );
        self.events.push(GameEvent::PlayerDeath);
        log::debug!("Player destroyed at ({:.0}, {:.0})", pos.x, pos.y);
        true
    }

    /// Add points and award any bonus lives crossed
    pub(super) fn add_score(&mut self, points: u64) {
        self.score += points;
        while let Some(&threshold) = self.config.player.bonus_life_at.get(self.next_bonus) {
            if self.score < threshold {
                break;
            }
            self.next_bonus += 1;
            let player = self.store.player_mut();
            player.lives += 1;
            let lives = player.lives;
            self.events.push(GameEvent::ExtraLife { lives });
            log::info!("Extra life at {} points ({} lives)", threshold, lives);
        }
    }

    /// Fire every due timer of the current run
    pub(super) fn run_timers(&mut self) {
        for timer in self.schedule.take_due(self.now_ms, self.generation) {
            self.fire_timer(timer);
        }
    }

    fn fire_timer(&mut self, timer: TimerKind) {
        let now_ms = self.now_ms;
        match timer {
            TimerKind::BeginPlay => {
                if self.phase == GamePhase::Ready {
                    self.phase = GamePhase::Playing;
                    self.events.push(GameEvent::StagePlayable { level: self.level });
                    log::info!("Level {} is live", self.level);
                }
            }
            TimerKind::AdvanceLevel => {
                if self.phase == GamePhase::LevelTransition {
                    self.level += 1;
                    self.difficulty = Difficulty::for_level(self.level, &self.config.attack);
                    self.reset_level(now_ms);
                    self.phase = GamePhase::Playing;
                    self.events.push(GameEvent::StagePlayable { level: self.level });
                }
            }
            TimerKind::ResolvePlayerDeath => self.resolve_player_death(),
            TimerKind::EndInvincibility => {
                let player = self.store.player_mut();
                if player.invincible_until_ms.is_some_and(|until| until <= now_ms) {
                    player.invincible_until_ms = None;
                }
            }
            TimerKind::RejoinFormation { enemy } => {
                let elapsed_secs = now_ms * 0.001;
                let formation = &self.config.formation;
                if let Some(e) = self.store.enemy_mut(enemy) {
                    if e.state() == EnemyState::Diving && e.set_state(EnemyState::Formation) {
                        e.pos.x = breathing_x(e.target.x, elapsed_secs, formation);
                        e.pos.y = e.target.y;
                    }
                }
            }
        }
    }

    fn resolve_player_death(&mut self) {
        if self.store.player().state != PlayerState::Exploding {
            return;
        }
        let now_ms = self.now_ms;
        let center_x = self.config.canvas_width / 2.0;
        let invincibility = self.config.player.invincibility_ms;

        let player = self.store.player_mut();
        player.lives = player.lives.saturating_sub(1);
        if player.lives > 0 {
            player.state = PlayerState::Alive;
            player.pos.x = center_x;
            player.invincible_until_ms = Some(now_ms + invincibility);
            let lives = player.lives;
            self.schedule.schedule(
                self.generation,
                now_ms + invincibility,
                TimerKind::EndInvincibility,
            );
            self.events.push(GameEvent::PlayerRespawn);
            log::info!("Respawned with {} lives left", lives);
        } else {
            self.game_over();
        }
    }

    /// Enter GAME_OVER: update the local best and queue one submission
    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        let new_high_score = self.score > self.high_score;
        self.high_score = self.high_score.max(self.score);
        self.submissions.push(ScoreSubmission {
            generation: self.generation,
            username: self.username.clone().unwrap_or_default(),
            score: self.score,
            level: self.level,
            timestamp_ms: self.now_ms,
        });
        self.events.push(GameEvent::GameOver {
            score: self.score,
            level: self.level,
            new_high_score,
        });
        log::info!(
            "Game over: {} points at level {} (best {})",
            self.score,
            self.level,
            self.high_score
        );
    }
}
