//! Card state

use crate::foundation::collections::SpriteHandle;
use crate::foundation::math::Vec2;
use crate::deck::stack::StackSide;

/// Index of a card within its deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub usize);

/// Where a card currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardHome {
    /// Idle in a stack
    Stack(StackSide),
    /// Owned by the active transfer
    InFlight,
}

/// A card and its stack-local placement
#[derive(Debug, Clone)]
pub struct Card {
    /// Sprite drawing the card
    pub sprite: SpriteHandle,
    /// Z-order within its home stack
    pub z: i32,
    /// Current home
    pub home: CardHome,
    /// Position relative to the home stack's origin (meaningless in flight)
    pub local: Vec2,
}
