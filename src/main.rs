//! Galaga entry point
//!
//! Browser: wires DOM events to the session and hands snapshots to a JS
//! renderer. Native: runs a seeded session headlessly under an autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use galaga_core::leaderboard::{InMemoryLeaderboard, LeaderboardError};
    use galaga_core::persistence::{KeyValueStore, LocalStorageStore, MemoryStore};
    use galaga_core::platform::{FrameClock, InputMapper, Renderer, TouchRegion, run_frame};
    use galaga_core::sim::{GameEvent, GameSession, Snapshot};
    use galaga_core::{GameConfig, Leaderboard, LocalHighScore, Settings};

    // Drawing and sound live on the JS side
    #[wasm_bindgen(inline_js = "
        export function draw_snapshot(json) {
            if (window.galagaRenderer) {
                window.galagaRenderer.draw(JSON.parse(json));
            }
        }

        export function play_cue(name) {
            if (window.galagaAudio && window.galagaAudio[name]) {
                window.galagaAudio[name]();
            }
        }
    ")]
    extern "C" {
        fn draw_snapshot(json: &str);
        fn play_cue(name: &str);
    }

    struct JsRenderer;

    impl Renderer for JsRenderer {
        fn draw(&mut self, snapshot: &Snapshot) {
            match serde_json::to_string(snapshot) {
                Ok(json) => draw_snapshot(&json),
                Err(e) => log::error!("Snapshot encoding failed: {}", e),
            }
        }
    }

    /// Page-side persistence; falls back to memory when LocalStorage is blocked
    enum PageStore {
        Local(LocalStorageStore),
        Memory(MemoryStore),
    }

    impl PageStore {
        fn open() -> Self {
            match LocalStorageStore::open() {
                Ok(store) => PageStore::Local(store),
                Err(e) => {
                    log::warn!("{}; progress will not be saved", e);
                    PageStore::Memory(MemoryStore::new())
                }
            }
        }

        fn as_store(&mut self) -> &mut dyn KeyValueStore {
            match self {
                PageStore::Local(store) => store,
                PageStore::Memory(store) => store,
            }
        }
    }

    struct Game {
        session: GameSession,
        clock: FrameClock,
        input: InputMapper,
        renderer: JsRenderer,
        store: PageStore,
        high_score: LocalHighScore,
        settings: Settings,
        leaderboard: Leaderboard<InMemoryLeaderboard>,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            if !run_frame(
                &mut self.session,
                &mut self.clock,
                &mut self.input,
                &mut self.renderer,
                time,
            ) {
                return;
            }
            if self.input.take_mute() {
                let muted = self.settings.toggle_mute();
                self.save_settings();
                log::info!("Sound {}", if muted { "off" } else { "on" });
            }
            self.dispatch_events();
            self.flush_submissions();
        }

        fn save_settings(&mut self) {
            if let Err(e) = self.settings.save(self.store.as_store()) {
                log::warn!("Could not save settings: {}", e);
            }
        }

        /// Sanitize and remember a leaderboard name for this and later runs
        fn set_username(&mut self, raw: &str) -> Result<String, LeaderboardError> {
            let name = self.settings.set_username(raw)?.to_string();
            self.save_settings();
            self.session.set_username(Some(name.clone()));
            log::info!("Playing as {}", name);
            Ok(name)
        }

        fn dispatch_events(&mut self) {
            for event in self.session.drain_events() {
                if self.settings.muted {
                    continue;
                }
                let cue = match event {
                    GameEvent::GameStart => "gameStart",
                    GameEvent::PlayerShot => "shoot",
                    GameEvent::EnemyDive { .. } => "dive",
                    GameEvent::EnemyDestroyed { .. } => "enemyExplode",
                    GameEvent::PlayerDeath => "playerExplode",
                    GameEvent::ExtraLife { .. } => "extraLife",
                    GameEvent::LevelClear { .. } => "levelClear",
                    GameEvent::GameOver { .. } => "gameOver",
                    _ => continue,
                };
                play_cue(cue);
            }
        }

        /// Game over: persist the local best, then report to the leaderboard.
        /// A missing or invalid name comes back as a failed outcome.
        fn flush_submissions(&mut self) {
            for submission in self.session.take_submissions() {
                self.high_score.record(submission.score);
                if let Err(e) = self.high_score.save(self.store.as_store()) {
                    log::warn!("Could not save high score: {}", e);
                }
                let outcome = self.leaderboard.submit(&submission);
                self.session.resolve_submission(submission.generation, outcome);
            }
        }
    }

    fn performance_now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Galaga starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let config = GameConfig::default();
        if let Some(canvas) = document.get_element_by_id("canvas") {
            let canvas: HtmlCanvasElement = canvas.dyn_into()?;
            canvas.set_width(config.canvas_width as u32);
            canvas.set_height(config.canvas_height as u32);
        }

        let mut store = PageStore::open();
        let high_score = LocalHighScore::load(&*store.as_store());
        let mut settings = Settings::load(&*store.as_store());
        let first_visit = settings.is_first_visit();
        if first_visit {
            settings.mark_visited();
            if let Err(e) = settings.save(store.as_store()) {
                log::warn!("Could not save settings: {}", e);
            }
        }

        let seed = js_sys::Date::now() as u64;
        let repeat = Some(config.fire_repeat_ms);
        let mut session = GameSession::new(config, seed, high_score.best());
        session.set_username(settings.username.clone());
        log::info!("Session created with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            clock: FrameClock::new(),
            input: InputMapper::new(repeat),
            renderer: JsRenderer,
            store,
            high_score,
            settings,
            leaderboard: Leaderboard::new(InMemoryLeaderboard::new()),
        }));

        setup_keyboard(&window, game.clone());
        setup_touch(&document, game.clone());
        setup_visibility(&window, &document, game.clone());
        setup_username_form(&document, game.clone(), first_visit);

        request_animation_frame(game);
        log::info!("Galaga running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_down(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            game.borrow_mut().input.key_up(&event.key());
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_touch(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        let regions = [
            ("touchLeft", TouchRegion::Left),
            ("touchRight", TouchRegion::Right),
            ("touchFire", TouchRegion::Fire),
        ];
        for (id, region) in regions {
            let Some(element) = document.get_element_by_id(id) else {
                continue;
            };
            {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    game.borrow_mut().input.touch_start(region);
                });
                let _ = element
                    .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
                closure.forget();
            }
            for kind in ["touchend", "touchcancel"] {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                    event.prevent_default();
                    game.borrow_mut().input.touch_end(region);
                });
                let _ = element.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn show_element(document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Name entry: shown on the first visit, reachable later from the menu
    fn setup_username_form(
        document: &web_sys::Document,
        game: Rc<RefCell<Game>>,
        first_visit: bool,
    ) {
        let Some(input) = document
            .get_element_by_id("username-input")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        if let Some(name) = &game.borrow().settings.username {
            input.set_value(name);
        }
        show_element(document, "username-prompt", first_visit);

        let Some(btn) = document.get_element_by_id("username-submit") else {
            return;
        };
        let document = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let result = game.borrow_mut().set_username(&input.value());
            match result {
                Ok(name) => {
                    input.set_value(&name);
                    show_element(&document, "username-error", false);
                    show_element(&document, "username-prompt", false);
                }
                Err(e) => {
                    if let Some(el) = document.get_element_by_id("username-error") {
                        el.set_text_content(Some(&e.to_string()));
                    }
                    show_element(&document, "username-error", true);
                }
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_visibility(
        window: &web_sys::Window,
        document: &web_sys::Document,
        game: Rc<RefCell<Game>>,
    ) {
        // Tab switch: stop updating and drawing, resync on return
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let visible = document_clone.visibility_state() == web_sys::VisibilityState::Visible;
                let mut g = game.borrow_mut();
                g.clock.set_visible(visible, performance_now());
                if !visible {
                    g.input.clear();
                }
                log::info!("Page {}", if visible { "visible" } else { "hidden" });
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur: keys released elsewhere never reach us
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            game.borrow_mut().input.clear();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;
    use std::fs;

    use galaga_core::consts::FRAME_MS;
    use galaga_core::leaderboard::{DEFAULT_LIMIT, InMemoryLeaderboard};
    use galaga_core::persistence::JsonFileStore;
    use galaga_core::platform::{Action, FrameClock, InputMapper, Renderer, run_frame};
    use galaga_core::sim::{EnemyState, GameEvent, GamePhase, GameSession, Snapshot};
    use galaga_core::{GameConfig, Leaderboard, LocalHighScore, Settings};

    /// Ten minutes of play at 60 fps
    const MAX_FRAMES: u64 = 60 * 60 * 10;
    const SEED: u64 = 0x6a1a6a;

    /// Keeps the last snapshot for the autopilot and logs progress
    #[derive(Default)]
    struct HeadlessRenderer {
        frames: u64,
        last: Option<Snapshot>,
    }

    impl Renderer for HeadlessRenderer {
        fn draw(&mut self, snapshot: &Snapshot) {
            self.frames += 1;
            if self.frames % 600 == 0 {
                log::debug!(
                    "frame {}: {:?} level {} score {} enemies {}",
                    self.frames,
                    snapshot.phase,
                    snapshot.level,
                    snapshot.score,
                    snapshot.enemies.len()
                );
            }
            self.last = Some(snapshot.clone());
        }
    }

    /// Track the lowest formation enemy and keep the trigger held
    fn steer(input: &mut InputMapper, snapshot: &Snapshot) {
        let target = snapshot
            .enemies
            .iter()
            .filter(|e| e.state() == EnemyState::Formation)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos.x);
        let x = snapshot.player.pos.x;
        let (left, right) = match target {
            Some(tx) if tx < x - 4.0 => (true, false),
            Some(tx) if tx > x + 4.0 => (false, true),
            _ => (false, false),
        };
        for (held, action) in [(left, Action::Left), (right, Action::Right)] {
            if held {
                input.press(action);
            } else {
                input.release(action);
            }
        }
        input.press(Action::Fire);
    }

    fn load_config() -> Result<GameConfig, Box<dyn Error>> {
        match std::env::args().nth(1) {
            Some(path) => {
                let raw = fs::read_to_string(&path)?;
                let config = GameConfig::from_json(&raw)?;
                log::info!("Loaded config from {}", path);
                Ok(config)
            }
            None => Ok(GameConfig::default()),
        }
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config = load_config()?;
        let save_path = std::env::temp_dir().join("galaga-core").join("save.json");
        let mut store = JsonFileStore::open(&save_path)?;
        let mut high_score = LocalHighScore::load(&store);
        let mut settings = Settings::load(&store);
        if settings.username.is_none() {
            settings.set_username("AUTOPILOT")?;
        }
        settings.mark_visited();
        settings.save(&mut store)?;

        let mut leaderboard = Leaderboard::new(InMemoryLeaderboard::new());
        let mut session = GameSession::new(config.clone(), SEED, high_score.best());
        session.set_username(settings.username.clone());

        let mut clock = FrameClock::new();
        let mut input = InputMapper::new(Some(config.fire_repeat_ms));
        let mut renderer = HeadlessRenderer::default();

        input.press(Action::Confirm);
        let mut now = 0.0;
        for _ in 0..MAX_FRAMES {
            now += FRAME_MS;
            run_frame(&mut session, &mut clock, &mut input, &mut renderer, now);

            for event in session.drain_events() {
                match event {
                    GameEvent::LevelClear { level } => log::info!("Stage {} cleared", level),
                    GameEvent::ExtraLife { lives } => log::info!("Extra life ({} left)", lives),
                    GameEvent::ScoreRanked { rank, is_personal_best } => {
                        log::info!("Ranked #{} (personal best: {})", rank, is_personal_best)
                    }
                    _ => {}
                }
            }

            for submission in session.take_submissions() {
                high_score.record(submission.score);
                high_score.save(&mut store)?;
                let outcome = leaderboard.submit(&submission);
                session.resolve_submission(submission.generation, outcome);
            }

            if session.phase() == GamePhase::GameOver {
                break;
            }
            if let Some(snapshot) = &renderer.last {
                steer(&mut input, snapshot);
            }
        }

        println!(
            "Run finished: {:?}, level {}, score {} (best {})",
            session.phase(),
            session.level(),
            session.score(),
            high_score.best().max(session.score())
        );
        if let Some(outcome) = session.last_submission() {
            println!(
                "Leaderboard: {}",
                outcome
                    .message
                    .as_deref()
                    .or(outcome.error.as_deref())
                    .unwrap_or("no response")
            );
        }

        println!("\n  #  NAME          SCORE  LEVEL");
        for (i, record) in leaderboard.fetch_leaderboard(DEFAULT_LIMIT).iter().enumerate() {
            println!(
                "{:>3}  {:<12} {:>6}  {:>5}",
                i + 1,
                record.username,
                record.score,
                record.level
            );
        }
        if let Some(stats) = leaderboard.fetch_stats() {
            println!(
                "\n{} games, {} players, best {}, average {}",
                stats.total_games, stats.total_players, stats.highest_score, stats.average_score
            );
        }
        log::info!("Saved progress to {}", save_path.display());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Galaga (native, headless) starting...");
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
