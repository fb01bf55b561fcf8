//! Sprite - the positionable, scalable drawable unit bound to an image

use crate::foundation::math::Vec2;
use bitflags::bitflags;

bitflags! {
    /// Which aspects of a sprite changed since the backend last synced it
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpriteDirty: u8 {
        /// Position, scale or rotation changed
        const TRANSFORM = 1 << 0;
        /// Alpha or tint changed
        const APPEARANCE = 1 << 1;
        /// Visibility toggled
        const VISIBILITY = 1 << 2;
        /// Draw order changed
        const ORDER = 1 << 3;
    }
}

const WHITE: [f32; 4] = [1.0; 4];

/// A drawable bound to an image identifier
///
/// Mutation goes through setters so the dirty flags stay accurate.
#[derive(Debug, Clone)]
pub struct Sprite {
    texture: String,
    position: Vec2,
    scale: Vec2,
    rotation: f32,
    alpha: f32,
    tint: [f32; 4],
    visible: bool,
    z_index: i32,
    dirty: SpriteDirty,
}

impl Sprite {
    /// Create a hidden sprite in the canonical default state
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            alpha: 1.0,
            tint: WHITE,
            visible: false,
            z_index: 0,
            dirty: SpriteDirty::all(),
        }
    }

    /// Return the sprite to the canonical default visual/transform state
    ///
    /// The image binding is kept; pooled sprites are never re-bound.
    pub fn reset(&mut self) {
        self.position = Vec2::zeros();
        self.scale = Vec2::new(1.0, 1.0);
        self.rotation = 0.0;
        self.alpha = 1.0;
        self.tint = WHITE;
        self.visible = false;
        self.z_index = 0;
        self.dirty = SpriteDirty::all();
    }

    /// Image identifier this sprite draws
    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// World position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Per-axis scale
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Rotation in radians
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Opacity in `0..=1`
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// RGBA color multiplier; white draws the image unmodified
    pub fn tint(&self) -> [f32; 4] {
        self.tint
    }

    /// Whether the sprite is drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Draw order; higher is drawn later
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Pending change flags
    pub fn dirty(&self) -> SpriteDirty {
        self.dirty
    }

    /// Set the world position
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.dirty |= SpriteDirty::TRANSFORM;
        }
    }

    /// Set a uniform scale
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vec2::new(scale, scale));
    }

    /// Set a per-axis scale
    pub fn set_scale(&mut self, scale: Vec2) {
        if self.scale != scale {
            self.scale = scale;
            self.dirty |= SpriteDirty::TRANSFORM;
        }
    }

    /// Set the rotation in radians
    pub fn set_rotation(&mut self, rotation: f32) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.dirty |= SpriteDirty::TRANSFORM;
        }
    }

    /// Set the opacity, clamped to `0..=1`
    pub fn set_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if self.alpha != alpha {
            self.alpha = alpha;
            self.dirty |= SpriteDirty::APPEARANCE;
        }
    }

    /// Set the RGBA color multiplier, each channel clamped to `0..=1`
    pub fn set_tint(&mut self, tint: [f32; 4]) {
        let tint = tint.map(|c| c.clamp(0.0, 1.0));
        if self.tint != tint {
            self.tint = tint;
            self.dirty |= SpriteDirty::APPEARANCE;
        }
    }

    /// Show or hide the sprite
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty |= SpriteDirty::VISIBILITY;
        }
    }

    /// Set the draw order
    pub fn set_z_index(&mut self, z_index: i32) {
        if self.z_index != z_index {
            self.z_index = z_index;
            self.dirty |= SpriteDirty::ORDER;
        }
    }

    /// Take and clear the pending change flags
    pub(crate) fn take_dirty(&mut self) -> SpriteDirty {
        std::mem::replace(&mut self.dirty, SpriteDirty::empty())
    }
}
