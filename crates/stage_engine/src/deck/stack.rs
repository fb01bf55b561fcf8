//! Card stack with an explicit top-card cache

use crate::deck::card::{Card, CardHome, CardId};
use crate::foundation::math::Vec2;

/// Which of the two stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackSide {
    /// Starting stack
    Left,
    /// Receiving stack
    Right,
}

impl StackSide {
    /// The other stack
    pub fn opposite(self) -> Self {
        match self {
            StackSide::Left => StackSide::Right,
            StackSide::Right => StackSide::Left,
        }
    }
}

/// Ordered collection of idle cards
///
/// Members are kept in insertion order and their z-orders increase
/// strictly with it, so the last member is the top card. `top` caches that
/// card; every push/pop refreshes it in O(1).
#[derive(Debug, Clone)]
pub struct Stack {
    side: StackSide,
    origin: Vec2,
    slot_offset: Vec2,
    cards: Vec<CardId>,
    top: Option<CardId>,
}

impl Stack {
    /// Create an empty stack anchored at `origin`
    pub fn new(side: StackSide, origin: Vec2, slot_offset: Vec2) -> Self {
        Self {
            side,
            origin,
            slot_offset,
            cards: Vec::new(),
            top: None,
        }
    }

    /// Which stack this is
    pub fn side(&self) -> StackSide {
        self.side
    }

    /// World position of the stack's first slot
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Move the stack; returns the translation applied
    pub fn set_origin(&mut self, origin: Vec2) -> Vec2 {
        let shift = origin - self.origin;
        self.origin = origin;
        shift
    }

    /// Members in insertion (bottom-to-top) order
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the stack has no members
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Local position of the slot the next pushed card lands in
    pub fn next_slot(&self) -> Vec2 {
        self.slot_offset * self.cards.len() as f32
    }

    /// Convert a stack-local position to world space
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.origin + local
    }

    /// Convert a world position to stack-local space
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        world - self.origin
    }

    /// Cached top card, without validation
    pub fn cached_top(&self) -> Option<CardId> {
        self.top
    }

    /// Top card, repairing the cache if it is stale
    pub fn top(&mut self, cards: &[Card]) -> Option<CardId> {
        if self.cache_is_valid(cards) {
            return self.top;
        }
        let rescanned = self.rescan_top(cards);
        log::debug!("[DECK] {:?} stack top cache stale ({:?}), rescanned to {:?}", self.side, self.top, rescanned);
        self.top = rescanned;
        rescanned
    }

    fn cache_is_valid(&self, cards: &[Card]) -> bool {
        match self.top {
            None => self.cards.is_empty(),
            Some(id) => {
                self.cards.last() == Some(&id)
                    && cards.get(id.0).is_some_and(|c| c.home == CardHome::Stack(self.side))
            }
        }
    }

    /// Member with the highest z-order, found by a full scan
    pub fn rescan_top(&self, cards: &[Card]) -> Option<CardId> {
        self.cards
            .iter()
            .copied()
            .filter(|id| cards.get(id.0).is_some())
            .max_by_key(|id| cards[id.0].z)
    }

    /// Highest z-order among members, if any
    pub fn max_z(&mut self, cards: &[Card]) -> Option<i32> {
        self.top(cards).map(|id| cards[id.0].z)
    }

    /// Place `id` on top at stack-local position `local`
    ///
    /// Assigns z = previous maximum + 1 (0 for an empty stack).
    pub fn push(&mut self, id: CardId, cards: &mut [Card], local: Vec2) -> i32 {
        let z = self.max_z(cards).map_or(0, |z| z + 1);
        let card = &mut cards[id.0];
        card.z = z;
        card.home = CardHome::Stack(self.side);
        card.local = local;
        self.cards.push(id);
        self.top = Some(id);
        z
    }

    /// Remove the top card and mark it in flight
    pub fn pop_top(&mut self, cards: &mut [Card]) -> Option<CardId> {
        let top = self.top(cards)?;
        if self.cards.last() == Some(&top) {
            self.cards.pop();
        } else if let Some(index) = self.cards.iter().position(|id| *id == top) {
            self.cards.remove(index);
        }
        cards[top.0].home = CardHome::InFlight;
        // Insertion order tracks z-order, so the new last member is the top
        self.top = self.cards.last().copied();
        Some(top)
    }

    /// Drop every member and the cache
    pub fn clear(&mut self) {
        self.cards.clear();
        self.top = None;
    }

    /// Forget the cached top (forces the next lookup to re-scan)
    pub fn invalidate_top(&mut self) {
        self.top = None;
    }
}
