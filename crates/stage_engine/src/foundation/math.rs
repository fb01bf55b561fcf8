//! Math utilities and types
//!
//! Provides the 2D math types used by the stage, plus the curve helpers
//! the card motion system animates along.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Build a [`Vec2`] from a `[x, y]` pair (the layout used in config files)
pub fn vec2(xy: [f32; 2]) -> Vec2 {
    Vec2::new(xy[0], xy[1])
}

/// Evaluate a quadratic Bézier curve at `t`
///
/// `(1-t)²·p0 + 2(1-t)t·p1 + t²·p2`. `t` is not clamped here; callers
/// that need a bounded progress clamp before calling.
pub fn quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Viewport size in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Map a normalized anchor (`0..1` on each axis) to a world position
    pub fn anchor(&self, anchor: [f32; 2]) -> Vec2 {
        Vec2::new(self.width * anchor[0], self.height * anchor[1])
    }

    /// Center of the viewport
    pub fn center(&self) -> Vec2 {
        self.anchor([0.5, 0.5])
    }
}
