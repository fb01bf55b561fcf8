//! Card transfer - one timed, curved relocation between stacks
//!
//! All points are in world space. Conversion to and from stack-local space
//! happens only when the transfer is created and when it commits.

use crate::deck::card::CardId;
use crate::deck::stack::StackSide;
use crate::foundation::math::{quadratic_bezier, Vec2};

/// An in-flight card
#[derive(Debug, Clone, PartialEq)]
pub struct CardTransfer {
    /// Card being moved
    pub card: CardId,
    /// Deck clock time the transfer began
    pub started_at: f64,
    /// Seconds from start to landing
    pub duration: f32,
    /// World position the card left from
    pub source: Vec2,
    /// Bézier control point
    pub control: Vec2,
    /// World position the card lands on
    pub destination: Vec2,
    /// Stack the card lands in
    pub to: StackSide,
    arc_height: f32,
}

impl CardTransfer {
    /// Create a transfer whose arc peaks `arc_height` above the midpoint
    pub fn new(
        card: CardId,
        started_at: f64,
        duration: f32,
        source: Vec2,
        destination: Vec2,
        arc_height: f32,
        to: StackSide,
    ) -> Self {
        Self {
            card,
            started_at,
            duration,
            source,
            control: control_point(source, destination, arc_height),
            destination,
            to,
            arc_height,
        }
    }

    /// Stack the card left
    pub fn from(&self) -> StackSide {
        self.to.opposite()
    }

    /// Progress at deck time `now`, clamped to `0..=1`
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / f64::from(self.duration)).clamp(0.0, 1.0) as f32
    }

    /// World position at progress `t`
    pub fn position_at(&self, t: f32) -> Vec2 {
        quadratic_bezier(self.source, self.control, self.destination, t)
    }

    /// Translate the endpoints, e.g. after the stacks were re-anchored
    pub fn translate(&mut self, source_shift: Vec2, destination_shift: Vec2) {
        self.source += source_shift;
        self.destination += destination_shift;
        self.control = control_point(self.source, self.destination, self.arc_height);
    }
}

fn control_point(source: Vec2, destination: Vec2, arc_height: f32) -> Vec2 {
    (source + destination) * 0.5 - Vec2::new(0.0, arc_height)
}
