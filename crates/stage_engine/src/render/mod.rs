//! Headless render model
//!
//! The engine never talks to a graphics API directly. Scenes mutate
//! [`Sprite`]s on a [`Stage`]; a presentation backend reads the stage once
//! per frame (using the dirty flags to skip unchanged sprites) and draws it.

pub mod sprite;
pub mod stage;

pub use sprite::{Sprite, SpriteDirty};
pub use stage::{Stage, StageStats};
