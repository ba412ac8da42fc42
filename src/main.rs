//! Wagon Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the
//! web the loop is driven by requestAnimationFrame and the 3D scene lives in
//! JS behind `window.wagonScene`; native builds run a short headless
//! autopilot session, useful for profiling and smoke testing the sim.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, PointerEvent};

    use wagon_dash::audio::{AudioManager, SoundEffect};
    use wagon_dash::consts::*;
    use wagon_dash::settings::{Language, Settings};
    use wagon_dash::sim::{
        Command, EntityBackend, EntityId, GameEvent, GamePhase, GameState, LaneIntent,
        apply_command, apply_intent, tick,
    };

    /// Bridge to the JS scene layer (`window.wagonScene`), which owns every
    /// mesh and material. When no scene is installed the backend hands out
    /// placeholder ids so the sim still runs headless.
    struct JsSceneBackend {
        next_fallback: u32,
    }

    impl JsSceneBackend {
        fn new() -> Self {
            Self { next_fallback: 0 }
        }

        fn scene() -> Option<js_sys::Object> {
            let window = web_sys::window()?;
            let value = js_sys::Reflect::get(&window, &JsValue::from_str("wagonScene")).ok()?;
            value.dyn_into::<js_sys::Object>().ok()
        }

        fn call(method: &str, args: &[JsValue]) -> Option<JsValue> {
            let scene = Self::scene()?;
            let function: js_sys::Function = js_sys::Reflect::get(&scene, &method.into())
                .ok()?
                .dyn_into()
                .ok()?;
            let list = js_sys::Array::new();
            for arg in args {
                list.push(arg);
            }
            function.apply(&scene, &list).ok()
        }

        fn fallback_id(&mut self) -> EntityId {
            self.next_fallback += 1;
            EntityId(self.next_fallback)
        }
    }

    impl EntityBackend for JsSceneBackend {
        fn create_wagon(&mut self, lane_x: f32, z: f32, color: u8) -> EntityId {
            match Self::call(
                "createWagon",
                &[lane_x.into(), z.into(), (color as f64).into()],
            )
            .and_then(|v| v.as_f64())
            {
                Some(id) => EntityId(id as u32),
                None => self.fallback_id(),
            }
        }

        fn create_obstacle(&mut self, lane_x: f32, z: f32, variant: u8) -> EntityId {
            match Self::call(
                "createObstacle",
                &[lane_x.into(), z.into(), (variant as f64).into()],
            )
            .and_then(|v| v.as_f64())
            {
                Some(id) => EntityId(id as u32),
                None => self.fallback_id(),
            }
        }

        fn release(&mut self, id: EntityId) {
            Self::call("release", &[(id.0 as f64).into()]);
        }

        fn set_forward(&mut self, id: EntityId, z: f32) {
            Self::call("setForward", &[(id.0 as f64).into(), z.into()]);
        }

        fn set_active(&mut self, id: EntityId, active: bool) {
            Self::call("setActive", &[(id.0 as f64).into(), active.into()]);
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        backend: JsSceneBackend,
        audio: AudioManager,
        settings: Settings,
        last_time: f64,
        touch_start: Option<(f32, f32, f64)>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            Self {
                state: GameState::new(seed, DEFAULT_TRACKS),
                backend: JsSceneBackend::new(),
                audio,
                settings,
                last_time: 0.0,
                touch_start: None,
            }
        }

        /// One animation frame: clamp the delta, tick, then feed the drained
        /// events to audio and HUD.
        fn frame(&mut self, now_ms: f64) {
            let dt = if self.last_time > 0.0 {
                (((now_ms - self.last_time) / 1000.0) as f32).min(MAX_FRAME_DT)
            } else {
                0.0
            };
            self.last_time = now_ms;

            tick(&mut self.state, &mut self.backend, dt);

            let events = self.state.drain_events();
            if events.is_empty() {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            for event in events {
                self.on_event(event, &document);
            }
        }

        fn on_event(&mut self, event: GameEvent, document: &Document) {
            let strings = self.settings.language.strings();
            match event {
                GameEvent::LaneChanged { .. } => self.audio.play(SoundEffect::Tap),
                GameEvent::Hit => {
                    self.audio.play(SoundEffect::Wrong);
                    show_message(document, strings.try_again);
                }
                GameEvent::Collected { stars } => {
                    self.audio.play(SoundEffect::Collect);
                    update_stars(document, stars);
                }
                GameEvent::Win => {
                    self.audio.play(SoundEffect::Celebration);
                    set_text(
                        document,
                        "next-level-text",
                        &format!("{} {}!", strings.next_level, self.state.level() + 1),
                    );
                    set_class(document, "celebration", true);
                }
                GameEvent::LevelUp { level } => {
                    set_text(
                        document,
                        "level-display",
                        &format!("{} {}", strings.level, level),
                    );
                    update_stars(document, 0);
                }
                GameEvent::PhaseChanged(phase) => match phase {
                    GamePhase::Play => set_class(document, "celebration", false),
                    GamePhase::Menu => {
                        set_class(document, "start-screen", true);
                        set_class(document, "hud", false);
                        update_stars(document, 0);
                        set_text(
                            document,
                            "level-display",
                            &format!("{} 1", strings.level),
                        );
                    }
                    _ => {}
                },
            }
        }

        fn set_language(&mut self, language: Language) {
            self.settings.language = language;
            self.settings.save();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                apply_strings(&document, language);
            }
        }
    }

    // === DOM helpers ===

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Toggle the stylesheet's show/hide convention
    fn set_class(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            if visible {
                let _ = classes.add_1("show");
                let _ = classes.remove_1("hide");
            } else {
                let _ = classes.remove_1("show");
                let _ = classes.add_1("hide");
            }
        }
    }

    fn show_message(document: &Document, text: &str) {
        set_text(document, "message", text);
        set_class(document, "message", true);
    }

    fn update_stars(document: &Document, stars: u32) {
        if let Ok(slots) = document.query_selector_all(".star-slot") {
            for i in 0..slots.length() {
                let Some(node) = slots.item(i) else { continue };
                let Ok(el) = node.dyn_into::<web_sys::Element>() else {
                    continue;
                };
                if i < stars {
                    let _ = el.class_list().add_1("filled");
                    el.set_text_content(Some("⭐"));
                } else {
                    let _ = el.class_list().remove_1("filled");
                    el.set_text_content(Some(""));
                }
            }
        }
    }

    fn apply_strings(document: &Document, language: Language) {
        let t = language.strings();
        set_text(document, "title", t.title);
        set_text(document, "subtitle", t.subtitle);
        set_text(document, "tracks-2-label", t.tracks2);
        set_text(document, "tracks-3-label", t.tracks3);
        set_text(document, "start-btn", t.start);
        set_text(document, "pause-title", t.pause_title);
        set_text(document, "resume-btn", t.resume);
        set_text(document, "restart-btn", t.restart);
        set_text(document, "quit-btn", t.main_menu);
        set_text(document, "celebration-title", t.level_complete);
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("missing element #{id}");
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>, document: &Document) {
        {
            let game = game.clone();
            on_click(document, "start-btn", move || {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                g.audio.resume();
                g.audio.play(SoundEffect::Horn);
                apply_command(&mut g.state, Command::Start, &mut g.backend);
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_class(&document, "start-screen", false);
                    set_class(&document, "hud", true);
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "pause-btn", move || {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                apply_command(&mut g.state, Command::Pause, &mut g.backend);
                g.audio.set_muted(true);
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_class(&document, "pause-menu", g.state.paused());
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "resume-btn", move || {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                apply_command(&mut g.state, Command::Resume, &mut g.backend);
                g.audio.set_muted(false);
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_class(&document, "pause-menu", false);
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "restart-btn", move || {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                apply_command(&mut g.state, Command::Restart, &mut g.backend);
                g.audio.set_muted(false);
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_class(&document, "pause-menu", false);
                    update_stars(&document, 0);
                }
            });
        }
        {
            let game = game.clone();
            on_click(document, "quit-btn", move || {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                apply_command(&mut g.state, Command::Quit, &mut g.backend);
                g.audio.set_muted(false);
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    set_class(&document, "pause-menu", false);
                }
            });
        }
        for tracks in [2usize, 3] {
            let game = game.clone();
            on_click(document, &format!("tracks-{tracks}"), move || {
                game.borrow_mut().state.set_track_count(tracks);
            });
        }
        for lane in 0..3usize {
            let game = game.clone();
            on_click(document, &format!("lane-btn-{lane}"), move || {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                apply_intent(&mut g.state, LaneIntent::Select(lane));
            });
        }
        for language in [Language::En, Language::Cs] {
            let game = game.clone();
            on_click(document, &format!("lang-{}", language.as_str()), move || {
                game.borrow_mut().set_language(language);
            });
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            match event.key().as_str() {
                "ArrowLeft" | "a" => apply_intent(&mut g.state, LaneIntent::Shift(-1)),
                "ArrowRight" | "d" => apply_intent(&mut g.state, LaneIntent::Shift(1)),
                "Escape" => {
                    let cmd = if g.state.paused() {
                        Command::Resume
                    } else {
                        Command::Pause
                    };
                    apply_command(&mut g.state, cmd, &mut g.backend);
                    g.audio.set_muted(g.state.paused());
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        set_class(&document, "pause-menu", g.state.paused());
                    }
                }
                " " => {
                    if g.state.phase() == GamePhase::Menu {
                        g.audio.resume();
                        g.audio.play(SoundEffect::Horn);
                        apply_command(&mut g.state, Command::Start, &mut g.backend);
                        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                            set_class(&document, "start-screen", false);
                            set_class(&document, "hud", true);
                        }
                    }
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Swipe left/right shifts a lane; a quick tap selects by screen third
    fn setup_pointer(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let now = js_sys::Date::now();
                game.borrow_mut().touch_start =
                    Some((event.client_x() as f32, event.client_y() as f32, now));
            });
            let _ = window
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let g = &mut *g;
                let Some((start_x, start_y, start_time)) = g.touch_start.take() else {
                    return;
                };
                let dx = event.client_x() as f32 - start_x;
                let dy = event.client_y() as f32 - start_y;
                let elapsed = js_sys::Date::now() - start_time;

                if elapsed < 300.0 && dx.abs() > 30.0 && dx.abs() > dy.abs() {
                    let step = if dx > 0.0 { 1 } else { -1 };
                    apply_intent(&mut g.state, LaneIntent::Shift(step));
                } else if elapsed < 200.0 && dx.abs() < 20.0 && dy.abs() < 20.0 {
                    let width = web_sys::window()
                        .and_then(|w| w.inner_width().ok())
                        .and_then(|v| v.as_f64())
                        .unwrap_or(1.0) as f32;
                    let zone = width / g.state.track_count() as f32;
                    let lane = (event.client_x() as f32 / zone) as usize;
                    apply_intent(&mut g.state, LaneIntent::Select(lane));
                }
            });
            let _ = window
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) {
        if let Some(window) = web_sys::window() {
            let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Wagon Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        apply_strings(&document, game.borrow().settings.language);
        setup_buttons(game.clone(), &document);
        setup_keyboard(game.clone());
        setup_pointer(game.clone());

        // Drive the frame loop from requestAnimationFrame
        let handle: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let starter = handle.clone();
        *starter.borrow_mut() = Some(Closure::new(move |now: f64| {
            game.borrow_mut().frame(now);
            request_animation_frame(handle.borrow().as_ref().unwrap());
        }));
        request_animation_frame(starter.borrow().as_ref().unwrap());
        // Keep the closure alive for the lifetime of the page
        std::mem::forget(starter);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use wagon_dash::consts::*;
    use wagon_dash::sim::{
        Command, GameEvent, GameState, LaneIntent, RecordingBackend, apply_command, apply_intent,
        tick,
    };

    env_logger::init();
    log::info!("Wagon Dash (native) starting headless demo...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(20240607);

    let mut state = GameState::new(seed, DEFAULT_TRACKS);
    let mut backend = RecordingBackend::new();
    apply_command(&mut state, Command::Start, &mut backend);

    // Autopilot: steer toward the safe lane of whichever row is closest,
    // then run a minute of simulated play at 60 Hz.
    let dt = 1.0 / 60.0;
    let mut collected = 0u32;
    let mut hits = 0u32;
    for _ in 0..(60 * 60) {
        let target = state
            .rows
            .rows()
            .iter()
            .min_by(|a, b| {
                (a.forward - PLAYER_Z)
                    .abs()
                    .total_cmp(&(b.forward - PLAYER_Z).abs())
            })
            .map(|r| r.safe_lane);
        if let Some(lane) = target {
            apply_intent(&mut state, LaneIntent::Select(lane));
        }

        tick(&mut state, &mut backend, dt);
        for event in state.drain_events() {
            match event {
                GameEvent::Collected { stars } => {
                    collected += 1;
                    log::info!("caught wagon #{collected} (stars: {stars})");
                }
                GameEvent::Hit => hits += 1,
                GameEvent::LevelUp { level } => log::info!("reached level {level}"),
                _ => {}
            }
        }
    }

    println!(
        "seed {seed}: level {}, {} wagons caught, {} hits, {} live entities",
        state.level(),
        collected,
        hits,
        backend.live_count()
    );
}
