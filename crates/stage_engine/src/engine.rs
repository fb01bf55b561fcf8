//! Core engine implementation
//!
//! [`Engine`] is the one object a host talks to: it owns the sprite stage,
//! the frame scheduler and the scene manager, and exposes the frame,
//! resize and scene-switch entry points.

use crate::core::config::{Config, ConfigError, EngineConfig};
use crate::foundation::collections::SceneId;
use crate::foundation::math::Viewport;
use crate::render::Stage;
use crate::scene::{ContentError, DialogueScript, SceneError, SceneKind, SceneManager, SceneServices};
use crate::scheduler::FrameScheduler;
use thiserror::Error;

/// Main engine struct
///
/// Single-threaded: every scene advances inside [`Engine::on_frame`], and
/// lifecycle calls happen between frames.
pub struct Engine {
    config: EngineConfig,
    stage: Stage,
    scheduler: FrameScheduler,
    scenes: SceneManager,
    viewport: Viewport,
}

impl Engine {
    /// Create an engine with no scenes
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        log::info!("[ENGINE] Initializing engine...");
        config.validate()?;
        let viewport = Viewport::new(config.viewport.width, config.viewport.height);

        Ok(Self {
            config,
            stage: Stage::new(),
            scheduler: FrameScheduler::new(),
            scenes: SceneManager::new(),
            viewport,
        })
    }

    fn parts(&mut self) -> (&mut SceneManager, SceneServices<'_>) {
        (
            &mut self.scenes,
            SceneServices {
                stage: &mut self.stage,
                scheduler: &mut self.scheduler,
                viewport: self.viewport,
                config: &self.config,
            },
        )
    }

    /// Register a scene of `kind`
    ///
    /// The first menu scene created becomes the home scene.
    pub fn create_scene(&mut self, kind: SceneKind) -> SceneId {
        let id = self.scenes.register(kind);
        if kind == SceneKind::Menu && self.scenes.home().is_none() && self.scenes.set_home(id).is_ok() {
            log::info!("[ENGINE] Scene {:?} designated home", id);
        }
        id
    }

    /// Designate `id` as the home scene
    pub fn set_home(&mut self, id: SceneId) -> Result<(), EngineError> {
        Ok(self.scenes.set_home(id)?)
    }

    /// Make `id` the active scene
    pub fn switch_to(&mut self, id: SceneId) -> Result<(), EngineError> {
        let (scenes, mut services) = self.parts();
        Ok(scenes.switch_to(id, &mut services)?)
    }

    /// Tear `id` down immediately
    pub fn teardown(&mut self, id: SceneId) -> Result<(), EngineError> {
        let (scenes, mut services) = self.parts();
        Ok(scenes.teardown(id, &mut services)?)
    }

    /// Advance every registered callback by `delta` seconds
    ///
    /// Negative and non-finite deltas are treated as zero.
    pub fn on_frame(&mut self, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.scheduler.tick(&mut self.stage, delta);
    }

    /// Re-layout every live scene for a new viewport size
    ///
    /// Safe to call at any time, including mid-transfer; repeated calls
    /// with the same size change nothing. Non-positive sizes are ignored.
    pub fn notify_viewport_resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::warn!("[ENGINE] Ignoring invalid viewport size {}x{}", width, height);
            return;
        }
        self.viewport = Viewport::new(width, height);
        log::debug!("[ENGINE] Viewport resized to {}x{}", width, height);
        let (scenes, mut services) = self.parts();
        scenes.resize(&mut services);
    }

    /// Hand the result of an out-of-frame content fetch to scene `id`
    ///
    /// Returns `Ok(false)` if the scene had already received its content.
    pub fn deliver_dialogue(
        &mut self,
        id: SceneId,
        content: Result<DialogueScript, ContentError>,
    ) -> Result<bool, EngineError> {
        let slot = self.scenes.content_slot(id)?;
        Ok(slot.deliver(content))
    }

    /// Tear down every scene
    pub fn shutdown(&mut self) {
        let (scenes, mut services) = self.parts();
        scenes.shutdown(&mut services);
        let stats = self.stage.stats();
        log::info!(
            "[ENGINE] Shutdown complete: {} sprite(s) created, {} destroyed, {} live",
            stats.created,
            stats.destroyed,
            self.stage.len()
        );
    }

    /// Sprite stage
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Mutable sprite stage, for presentation backends syncing dirty sprites
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Frame scheduler
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Scene manager
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Currently active scene
    pub fn active_scene(&self) -> Option<SceneId> {
        self.scenes.active()
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Scene lifecycle call failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}
