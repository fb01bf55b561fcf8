//! Stage engine showcase
//!
//! Headless tour through every scene: menu, card deck, fire, dialogue and
//! back home. Frames are paced by a simulated clock so the tour runs as
//! fast as the machine allows.
//!
//! Usage: `showcase [engine.toml|engine.ron] [dialogue.json]`

use stage_engine::foundation::logging;
use stage_engine::prelude::*;
use stage_engine::scene::{CardDeckScene, DialogueScene, MenuScene, ParticleDemoScene};
use std::time::{Duration, Instant};

/// Script used when no dialogue path is given
const DEFAULT_DIALOGUE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/dialogue.json");

/// Simulated frame period (60 Hz)
const FRAME_PERIOD: Duration = Duration::from_micros(16_667);

#[derive(Clone, Copy)]
struct Scenes {
    menu: SceneId,
    deck: SceneId,
    fire: SceneId,
    dialogue: SceneId,
}

struct ShowcaseApp {
    engine: Engine,
    clock: FrameClock,
    now: Instant,
    scenes: Scenes,
    dialogue_path: String,
    synced: usize,
}

impl ShowcaseApp {
    fn new(config: EngineConfig, dialogue_path: String) -> Result<Self, EngineError> {
        let now = Instant::now();
        let clock = FrameClock::starting_at(now, config.clock.max_delta);
        let mut engine = Engine::new(config)?;

        let scenes = Scenes {
            menu: engine.create_scene(SceneKind::Menu),
            deck: engine.create_scene(SceneKind::CardDeck),
            fire: engine.create_scene(SceneKind::ParticleDemo),
            dialogue: engine.create_scene(SceneKind::Dialogue),
        };

        Ok(Self { engine, clock, now, scenes, dialogue_path, synced: 0 })
    }

    /// Pump `seconds` worth of frames
    fn run_for(&mut self, seconds: f32) {
        let frames = (seconds / FRAME_PERIOD.as_secs_f32()).round() as usize;
        for _ in 0..frames {
            self.now += FRAME_PERIOD;
            let delta = self.clock.tick_at(self.now);
            self.engine.on_frame(delta);
            // Stand-in for a presentation backend
            self.synced += self.engine.stage_mut().sync_dirty(|_, _, _| {});
        }
    }

    fn load_dialogue(&self) -> Result<DialogueScript, ContentError> {
        log::info!("Loading dialogue from {}", self.dialogue_path);
        DialogueScript::load(&self.dialogue_path)
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let Scenes { menu, deck, fire, dialogue } = self.scenes;

        self.engine.switch_to(menu)?;
        self.run_for(1.0);
        if let Some(scene) = self.engine.scenes().scene_as::<MenuScene>(menu) {
            scene.select_next();
            log::info!("Menu selection: {:?}", scene.selected_label());
        }

        self.engine.switch_to(deck)?;
        self.run_for(4.0);
        self.engine.notify_viewport_resize(1920.0, 1080.0);
        self.run_for(4.0);
        if let Some(scene) = self.engine.scenes().scene_as::<CardDeckScene>(deck) {
            let deck = scene.deck();
            let deck = deck.borrow();
            log::info!(
                "Deck: stacks {:?}, {} card(s) landed, in flight: {}",
                deck.stack_sizes(),
                deck.landed_count(),
                deck.transfer().is_some()
            );
        }

        self.engine.switch_to(fire)?;
        self.run_for(5.0);
        if let Some(scene) = self.engine.scenes().scene_as::<ParticleDemoScene>(fire) {
            let system = scene.system();
            let system = system.borrow();
            let pool = system.pool_stats();
            log::info!(
                "Fire: {:?}, pool acquired {} / constructed {}",
                system.counts(),
                pool.acquired,
                pool.constructed
            );
        }

        self.engine.switch_to(dialogue)?;
        // Content is fetched between frames, never inside one
        let content = self.load_dialogue();
        self.engine.deliver_dialogue(dialogue, content)?;
        self.run_for(10.0);
        if let Some(scene) = self.engine.scenes().scene_as::<DialogueScene>(dialogue) {
            log::info!("Dialogue: {:?}, {} line(s) shown", scene.phase(), scene.revealed_lines());
        }

        self.engine.switch_to(menu)?;
        self.run_for(1.0);

        let stats = self.engine.scheduler().stats();
        log::info!(
            "Scheduler: {} frame(s), {} invocation(s), {} failure(s), {} panic(s)",
            stats.frames,
            stats.invocations,
            stats.failures,
            stats.panics
        );
        log::info!(
            "Stage: {} live sprite(s), {} drawn, {} sprite sync(s), average {:.1} fps simulated",
            self.engine.stage().len(),
            self.engine.stage().draw_order().len(),
            self.synced,
            self.clock.average_fps()
        );

        self.engine.shutdown();
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting stage engine showcase");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    let dialogue_path = args.next().unwrap_or_else(|| DEFAULT_DIALOGUE.to_string());

    let mut app = ShowcaseApp::new(config, dialogue_path)?;
    match app.run() {
        Ok(()) => {
            log::info!("Showcase completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Showcase failed: {}", e);
            Err(e.into())
        }
    }
}
