//! Invariants that must hold for any input stream

use std::collections::{HashMap, HashSet};

use galaga_core::GameConfig;
use galaga_core::sim::{
    EnemyState, EntityId, FrameTime, GameEvent, GameSession, PlayerState, TickInput, tick,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Frame {
    left: bool,
    right: bool,
    fire: bool,
    dt_ms: f64,
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 8.0f64..50.0).prop_map(
        |(left, right, fire, dt_ms)| Frame {
            left,
            right,
            fire,
            dt_ms,
        },
    )
}

/// Start a run and skip the intro so every frame is live play
fn live_session(seed: u64) -> (GameSession, f64) {
    let mut session = GameSession::new(GameConfig::default(), seed, 0);
    session.start_game(0.0);
    let now = session.config().ready_delay_ms;
    tick(&mut session, &TickInput::default(), FrameTime::new(now, 16.0));
    (session, now)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn score_and_bullets_stay_in_bounds(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 200..900),
    ) {
        let (mut session, mut now) = live_session(seed);
        let mut last_score = session.score();

        for frame in frames {
            now += frame.dt_ms;
            let input = TickInput {
                left: frame.left,
                right: frame.right,
                fire: frame.fire,
                ..Default::default()
            };
            tick(&mut session, &input, FrameTime::new(now, frame.dt_ms));

            prop_assert!(session.score() >= last_score);
            last_score = session.score();

            let cap = session.player().max_bullets(session.config());
            prop_assert!(session.store().active_bullet_count() <= cap);

            let x = session.player().pos.x;
            let margin = session.config().player.edge_margin;
            prop_assert!(x >= margin && x <= session.config().canvas_width - margin);
        }
    }

    #[test]
    fn enemy_lifecycle_is_legal(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 200..900),
    ) {
        let (mut session, mut now) = live_session(seed);
        let mut last_state: HashMap<EntityId, EnemyState> = HashMap::new();
        let mut gone: HashSet<EntityId> = HashSet::new();

        for frame in frames {
            now += frame.dt_ms;
            let input = TickInput {
                left: frame.left,
                right: frame.right,
                fire: frame.fire,
                ..Default::default()
            };
            tick(&mut session, &input, FrameTime::new(now, frame.dt_ms));

            let mut current = HashMap::new();
            for enemy in session.store().enemies() {
                prop_assert!(!gone.contains(&enemy.id), "enemy {} came back", enemy.id);
                // Dead enemies are reaped within the tick that killed them
                prop_assert_ne!(enemy.state(), EnemyState::Dead);
                if let Some(prev) = last_state.get(&enemy.id) {
                    let next = enemy.state();
                    prop_assert!(
                        *prev == next || prev.can_transition_to(next),
                        "illegal {:?} -> {:?}", prev, next
                    );
                }
                current.insert(enemy.id, enemy.state());
            }
            gone.extend(last_state.keys().filter(|id| !current.contains_key(*id)));
            last_state = current;
        }
    }

    #[test]
    fn lives_only_change_through_death_or_bonus(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 200..900),
    ) {
        let (mut session, mut now) = live_session(seed);
        session.drain_events();
        let mut lives = session.player().lives;
        // Deaths whose life has not been deducted yet
        let mut pending_deaths = 0u32;

        for frame in frames {
            now += frame.dt_ms;
            let input = TickInput {
                left: frame.left,
                right: frame.right,
                fire: frame.fire,
                ..Default::default()
            };
            tick(&mut session, &input, FrameTime::new(now, frame.dt_ms));

            let mut gained = 0u32;
            let mut lost = 0u32;
            for event in session.drain_events() {
                match event {
                    GameEvent::PlayerDeath => pending_deaths += 1,
                    GameEvent::ExtraLife { .. } => gained += 1,
                    GameEvent::PlayerRespawn | GameEvent::GameOver { .. } => lost += 1,
                    _ => {}
                }
            }
            prop_assert!(lost <= pending_deaths, "life lost without a death");
            pending_deaths -= lost;

            let current = session.player().lives;
            prop_assert_eq!(current + lost, lives + gained);
            if session.player().is_invincible() {
                prop_assert_eq!(session.player().state, PlayerState::Alive);
            }
            lives = current;
        }
    }
}
