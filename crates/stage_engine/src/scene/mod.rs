//! Scene lifecycle
//!
//! A scene is one self-contained visual demo (menu, card deck, fire,
//! dialogue). Scenes are addressed by [`SceneId`] and move through
//!
//! ```text
//! Uninstantiated ──switch_to──► Active ──switch away──► Inactive   (home only)
//!                                  │                       │
//!                                  └──────teardown────► Destroyed ──switch_to──► Active (fresh)
//! ```
//!
//! Only the designated home scene is ever cached as Inactive; every other
//! scene is torn down the moment it stops being active.

pub mod scene_manager;
pub mod scenes;

pub use scene_manager::{SceneManager, SceneState};
pub use scenes::{
    AvatarSide, CardDeckScene, ContentError, ContentSlot, ContentState, DialogueLine,
    DialoguePhase, DialogueScene, DialogueScript, MenuScene, ParticleDemoScene,
};

use crate::core::config::EngineConfig;
use crate::foundation::collections::SceneId;
use crate::foundation::math::Viewport;
use crate::render::Stage;
use crate::scheduler::FrameScheduler;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// The fixed set of scene variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKind {
    /// Entry menu, normally the home scene
    Menu,
    /// Two card stacks trading cards
    CardDeck,
    /// Fire particle simulation
    ParticleDemo,
    /// Scrolling dialogue view
    Dialogue,
}

impl SceneKind {
    fn seed_offset(self) -> u64 {
        match self {
            Self::Menu => 0,
            Self::CardDeck => 1,
            Self::ParticleDemo => 2,
            Self::Dialogue => 3,
        }
    }
}

/// Scene lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id was never registered
    #[error("unknown scene {0:?}")]
    UnknownScene(SceneId),

    /// A different scene is already home
    #[error("scene {current:?} is already the home scene")]
    HomeAlreadyDesignated {
        /// The existing home scene
        current: SceneId,
    },

    /// The scene has no live instance (never activated, or destroyed)
    #[error("scene {0:?} is not instantiated")]
    NotInstantiated(SceneId),

    /// The scene does not accept external content
    #[error("scene {0:?} has no content slot")]
    NoContentSlot(SceneId),
}

/// Engine services a scene lifecycle call may use
pub struct SceneServices<'a> {
    /// Sprite store
    pub stage: &'a mut Stage,
    /// Shared per-frame callback registry
    pub scheduler: &'a mut FrameScheduler,
    /// Current viewport
    pub viewport: Viewport,
    /// Engine configuration
    pub config: &'a EngineConfig,
}

impl SceneServices<'_> {
    /// Context for lifecycle calls on scene `id`
    pub fn context(&mut self, id: SceneId) -> SceneContext<'_> {
        SceneContext {
            id,
            stage: &mut *self.stage,
            scheduler: &mut *self.scheduler,
            viewport: self.viewport,
            config: self.config,
        }
    }
}

/// What a scene sees during `activate`/`deactivate`/`teardown`/`resize`
pub struct SceneContext<'a> {
    /// Id of the scene being called; owner of any ticker it registers
    pub id: SceneId,
    /// Sprite store
    pub stage: &'a mut Stage,
    /// Shared per-frame callback registry
    pub scheduler: &'a mut FrameScheduler,
    /// Current viewport
    pub viewport: Viewport,
    /// Engine configuration
    pub config: &'a EngineConfig,
}

impl SceneContext<'_> {
    /// Fresh RNG for a scene of `kind`
    ///
    /// Deterministic when the config carries a seed.
    pub fn rng(&self, kind: SceneKind) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(kind.seed_offset())),
            None => StdRng::from_entropy(),
        }
    }
}

/// Contract every scene variant implements
///
/// A scene is built when it is first switched to; it owns all of its
/// sprites from that point until [`Scene::teardown`].
pub trait Scene {
    /// Variant of this scene
    fn kind(&self) -> SceneKind;

    /// Show the scene and register its per-frame callbacks
    fn activate(&mut self, ctx: &mut SceneContext<'_>);

    /// Hide the scene; its callbacks have already been unregistered
    fn deactivate(&mut self, ctx: &mut SceneContext<'_>);

    /// Release every resource; its callbacks have already been unregistered
    fn teardown(&mut self, ctx: &mut SceneContext<'_>);

    /// Re-layout for `ctx.viewport`. Must be idempotent.
    fn resize(&mut self, _ctx: &mut SceneContext<'_>) {}

    /// Slot external content is delivered into, if the scene takes any
    fn content_slot(&self) -> Option<ContentSlot> {
        None
    }

    /// Downcasting support for typed inspection
    fn as_any(&self) -> &dyn Any;
}
