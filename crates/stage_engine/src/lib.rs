//! # Stage Engine
//!
//! A frame-driven 2D scene engine: pooled sprites, a per-frame callback
//! scheduler, a fire particle simulation, a two-stack card animator and a
//! scene lifecycle manager tying them together.
//!
//! ## Features
//!
//! - **Object Pool**: per-kind sprite reuse with single ownership
//! - **Frame Scheduler**: ordered callbacks grouped by owning scene, with
//!   per-callback error isolation
//! - **Particles**: capped fire emitter with base, flame and spark types
//! - **Deck**: serialized curved card transfers with z-order bookkeeping
//! - **Scenes**: home caching and clean teardown of everything else
//!
//! Rendering is headless: scenes mutate [`render::Stage`] sprites and a
//! host backend mirrors them through [`render::Stage::sync_dirty`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stage_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default())?;
//!     let menu = engine.create_scene(SceneKind::Menu);
//!     let deck = engine.create_scene(SceneKind::CardDeck);
//!
//!     engine.switch_to(menu)?;
//!     engine.switch_to(deck)?;
//!
//!     let mut clock = FrameClock::new(0.1);
//!     for _ in 0..600 {
//!         engine.on_frame(clock.tick());
//!     }
//!     engine.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Runtime subsystems
pub mod render;
pub mod pooling;
pub mod scheduler;
pub mod particles;
pub mod deck;
pub mod scene;

mod engine;

#[cfg(test)]
mod tests;

pub use engine::{Engine, EngineError};
pub use core::config::EngineConfig;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError,
        config::{Config, ConfigError},
        foundation::{
            collections::{SceneId, SpriteHandle},
            math::{Vec2, Viewport},
            time::FrameClock,
        },
        render::{Sprite, Stage},
        scene::{ContentError, DialogueScript, SceneKind, SceneState},
        scheduler::{FrameContext, FrameScheduler, TickError},
    };
}
