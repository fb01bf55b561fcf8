//! Deck - drives transfers between the two stacks

use crate::core::config::DeckConfig;
use crate::deck::card::{Card, CardHome, CardId};
use crate::deck::stack::{Stack, StackSide};
use crate::deck::transfer::CardTransfer;
use crate::foundation::math::{vec2, Vec2, Viewport};
use crate::render::Stage;
use rand::rngs::StdRng;
use rand::Rng;

/// Something noteworthy that happened during a deck update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckEvent {
    /// A card left its stack
    Started {
        /// Card in flight
        card: CardId,
        /// Stack it left
        from: StackSide,
    },
    /// A card was committed to its destination stack
    Landed {
        /// Card that landed
        card: CardId,
        /// Stack it joined
        to: StackSide,
        /// Z-order it was given
        z: i32,
    },
}

/// Two card stacks plus at most one in-flight transfer
pub struct Deck {
    config: DeckConfig,
    cards: Vec<Card>,
    left: Stack,
    right: Stack,
    transfer: Option<CardTransfer>,
    /// Stack the next transfer is taken from
    source: StackSide,
    /// Seconds since the deck was created or reset
    clock: f64,
    since_last_move: f32,
    landed: u64,
    rng: StdRng,
}

impl Deck {
    /// Create the deck's card sprites, all in the left stack and hidden
    pub fn new(config: DeckConfig, viewport: Viewport, stage: &mut Stage, rng: StdRng) -> Self {
        let cards = (0..config.card_count)
            .map(|_| Card {
                sprite: stage.create_sprite(&config.card_texture),
                z: 0,
                home: CardHome::InFlight,
                local: Vec2::zeros(),
            })
            .collect();
        let slot_offset = vec2(config.slot_offset);
        let (left_origin, right_origin) = Self::anchors(&config, viewport);

        let mut deck = Self {
            left: Stack::new(StackSide::Left, left_origin, slot_offset),
            right: Stack::new(StackSide::Right, right_origin, slot_offset),
            config,
            cards,
            transfer: None,
            source: StackSide::Left,
            clock: 0.0,
            since_last_move: 0.0,
            landed: 0,
            rng,
        };
        deck.reset(stage);
        log::info!("[DECK] Deck created with {} cards", deck.cards.len());
        deck
    }

    fn anchors(config: &DeckConfig, viewport: Viewport) -> (Vec2, Vec2) {
        (viewport.anchor(config.left_anchor), viewport.anchor(config.right_anchor))
    }

    fn split(&mut self, side: StackSide) -> (&mut Stack, &mut Vec<Card>) {
        match side {
            StackSide::Left => (&mut self.left, &mut self.cards),
            StackSide::Right => (&mut self.right, &mut self.cards),
        }
    }

    /// Return to the canonical state: every card in the left stack, no
    /// transfer, timers at zero
    ///
    /// An in-flight transfer is discarded without landing.
    pub fn reset(&mut self, stage: &mut Stage) {
        if let Some(transfer) = self.transfer.take() {
            log::debug!("[DECK] Discarding in-flight transfer of {:?}", transfer.card);
        }
        self.left.clear();
        self.right.clear();
        for index in 0..self.cards.len() {
            let local = self.left.next_slot();
            self.left.push(CardId(index), &mut self.cards, local);
        }
        self.source = StackSide::Left;
        self.clock = 0.0;
        self.since_last_move = 0.0;
        self.landed = 0;
        self.sync_stack(StackSide::Left, stage);
    }

    /// Advance the deck by one frame
    ///
    /// While a transfer is active it is animated (and landed when done);
    /// otherwise a new transfer starts once the move interval has elapsed.
    /// A frame that lands a card never starts the next transfer.
    pub fn update(&mut self, stage: &mut Stage, delta: f32) -> Option<DeckEvent> {
        self.clock += f64::from(delta);
        self.since_last_move += delta;

        if let Some(transfer) = &self.transfer {
            let t = transfer.progress(self.clock);
            let position = transfer.position_at(t);
            let sprite = self.cards[transfer.card.0].sprite;
            stage.update(sprite, |s| s.set_position(position));
            if t >= 1.0 {
                return self.land(stage);
            }
            return None;
        }

        if self.since_last_move < self.config.move_interval {
            return None;
        }
        self.begin_transfer(stage)
    }

    fn begin_transfer(&mut self, stage: &mut Stage) -> Option<DeckEvent> {
        if self.stack(self.source).is_empty() {
            self.source = self.source.opposite();
            log::info!("[DECK] Source stack empty, now moving {:?} -> {:?}", self.source, self.source.opposite());
        }
        let from = self.source;
        let to = from.opposite();

        let jitter = self.jitter();
        let (stack, cards) = self.split(from);
        let card = stack.pop_top(cards)?;
        let source = stack.to_world(cards[card.0].local);
        let sprite = cards[card.0].sprite;

        let target = self.stack(to);
        let destination = target.to_world(target.next_slot()) + jitter;

        self.transfer = Some(CardTransfer::new(
            card,
            self.clock,
            self.config.transfer_duration,
            source,
            destination,
            self.config.arc_height,
            to,
        ));
        self.since_last_move = 0.0;

        let flight_z = self.config.flight_z;
        stage.update(sprite, |s| s.set_z_index(flight_z));
        log::debug!("[DECK] Card {:?} leaving {:?} stack", card, from);
        Some(DeckEvent::Started { card, from })
    }

    fn land(&mut self, stage: &mut Stage) -> Option<DeckEvent> {
        let transfer = self.transfer.take()?;
        let (stack, cards) = self.split(transfer.to);
        let local = stack.to_local(transfer.destination);
        let z = stack.push(transfer.card, cards, local);
        let sprite = cards[transfer.card.0].sprite;

        stage.update(sprite, |s| {
            s.set_position(transfer.destination);
            s.set_z_index(z);
        });
        self.landed += 1;
        log::debug!("[DECK] Card {:?} landed on {:?} stack at z {}", transfer.card, transfer.to, z);
        Some(DeckEvent::Landed { card: transfer.card, to: transfer.to, z })
    }

    fn jitter(&mut self) -> Vec2 {
        let amount = self.config.jitter;
        if amount > 0.0 {
            Vec2::new(
                self.rng.gen_range(-amount..=amount),
                self.rng.gen_range(-amount..=amount),
            )
        } else {
            Vec2::zeros()
        }
    }

    /// Re-anchor the stacks for a new viewport
    ///
    /// Idle cards follow their stack; an in-flight transfer has its
    /// endpoints translated with their stacks. Idempotent.
    pub fn notify_resize(&mut self, viewport: Viewport, stage: &mut Stage) {
        let (left_origin, right_origin) = Self::anchors(&self.config, viewport);
        let left_shift = self.left.set_origin(left_origin);
        let right_shift = self.right.set_origin(right_origin);

        if let Some(transfer) = self.transfer.as_mut() {
            let (source_shift, destination_shift) = match transfer.to {
                StackSide::Right => (left_shift, right_shift),
                StackSide::Left => (right_shift, left_shift),
            };
            transfer.translate(source_shift, destination_shift);
            let position = transfer.position_at(transfer.progress(self.clock));
            let sprite = self.cards[transfer.card.0].sprite;
            stage.update(sprite, |s| s.set_position(position));
        }

        self.sync_stack(StackSide::Left, stage);
        self.sync_stack(StackSide::Right, stage);
    }

    fn sync_stack(&self, side: StackSide, stage: &mut Stage) {
        let stack = self.stack(side);
        for id in stack.cards() {
            let card = &self.cards[id.0];
            let position = stack.to_world(card.local);
            stage.update(card.sprite, |s| {
                s.set_position(position);
                s.set_z_index(card.z);
            });
        }
    }

    /// Show or hide every card
    pub fn set_visible(&self, stage: &mut Stage, visible: bool) {
        for card in &self.cards {
            stage.update(card.sprite, |s| s.set_visible(visible));
        }
    }

    /// Discard any transfer and destroy every card sprite
    pub fn teardown(&mut self, stage: &mut Stage) {
        self.transfer = None;
        self.left.clear();
        self.right.clear();
        for card in self.cards.drain(..) {
            stage.destroy_sprite(card.sprite);
        }
    }

    /// Card counts as `(left, right)`, excluding a card in flight
    pub fn stack_sizes(&self) -> (usize, usize) {
        (self.left.len(), self.right.len())
    }

    /// One of the stacks
    pub fn stack(&self, side: StackSide) -> &Stack {
        match side {
            StackSide::Left => &self.left,
            StackSide::Right => &self.right,
        }
    }

    /// Current top card of a stack (re-scanning a stale cache)
    pub fn top_card(&mut self, side: StackSide) -> Option<CardId> {
        let (stack, cards) = self.split(side);
        stack.top(cards)
    }

    /// The active transfer, if any
    pub fn transfer(&self) -> Option<&CardTransfer> {
        self.transfer.as_ref()
    }

    /// All cards, indexed by [`CardId`]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Stack the next transfer will be taken from
    pub fn source_side(&self) -> StackSide {
        self.source
    }

    /// Transfers landed since creation or the last reset
    pub fn landed_count(&self) -> u64 {
        self.landed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    const FRAME: f32 = 1.0 / 60.0;

    fn deck_with(config: DeckConfig, stage: &mut Stage) -> Deck {
        Deck::new(config, Viewport::new(1280.0, 720.0), stage, StdRng::seed_from_u64(5))
    }

    fn run_until(deck: &mut Deck, stage: &mut Stage, max_frames: usize,
        mut done: impl FnMut(&Deck, Option<DeckEvent>) -> bool) -> bool
    {
        for _ in 0..max_frames {
            let event = deck.update(stage, FRAME);
            if done(deck, event) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_initial_state_all_left() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);

        assert_eq!(deck.stack_sizes(), (144, 0));
        assert!(deck.transfer().is_none());
        for (index, id) in deck.stack(StackSide::Left).cards().iter().enumerate() {
            assert_eq!(id.0, index);
            assert_eq!(deck.cards()[id.0].z, index as i32);
        }
        assert_eq!(deck.top_card(StackSide::Left), Some(CardId(143)));
        assert_eq!(deck.top_card(StackSide::Right), None);
    }

    #[test]
    fn test_first_transfer_end_to_end() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);

        assert!(run_until(&mut deck, &mut stage, 120, |d, _| d.transfer().is_some()));
        assert_eq!(deck.stack_sizes(), (143, 0));
        let moving = deck.transfer().unwrap().card;
        assert_eq!(moving, CardId(143));
        assert_eq!(deck.cards()[moving.0].home, CardHome::InFlight);

        let mut landed = None;
        assert!(run_until(&mut deck, &mut stage, 240, |_, e| {
            if let Some(DeckEvent::Landed { z, .. }) = e {
                landed = Some(z);
                true
            } else {
                false
            }
        }));
        assert_eq!(landed, Some(0));
        assert_eq!(deck.stack_sizes(), (143, 1));
        assert!(deck.transfer().is_none());
        assert_eq!(deck.top_card(StackSide::Right), Some(moving));
        assert_eq!(deck.top_card(StackSide::Left), Some(CardId(142)));
    }

    #[test]
    fn test_card_lands_on_destination_point() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);

        run_until(&mut deck, &mut stage, 120, |d, _| d.transfer().is_some());
        let transfer = deck.transfer().unwrap().clone();
        run_until(&mut deck, &mut stage, 240, |_, e| matches!(e, Some(DeckEvent::Landed { .. })));

        let card = &deck.cards()[transfer.card.0];
        let sprite = stage.sprite(card.sprite).unwrap();
        assert_relative_eq!(sprite.position(), transfer.destination, epsilon = 1e-3);
        assert_relative_eq!(deck.stack(StackSide::Right).to_world(card.local), transfer.destination, epsilon = 1e-3);
        assert_eq!(sprite.z_index(), card.z);
    }

    #[test]
    fn test_landing_z_is_previous_max_plus_one() {
        let mut stage = Stage::new();
        let mut config = DeckConfig::default();
        config.card_count = 10;
        config.move_interval = 0.1;
        config.transfer_duration = 0.2;
        let mut deck = deck_with(config, &mut stage);

        let mut lands = 0;
        for _ in 0..60 * 10 {
            let before_max = {
                let side = deck.transfer().map(|t| t.to);
                side.and_then(|s| {
                    let stack = deck.stack(s);
                    stack.rescan_top(deck.cards()).map(|id| deck.cards()[id.0].z)
                })
            };
            if let Some(DeckEvent::Landed { z, to, .. }) = deck.update(&mut stage, FRAME) {
                assert_eq!(z, before_max.map_or(0, |m| m + 1));
                let stack = deck.stack(to);
                assert_eq!(stack.cached_top(), stack.rescan_top(deck.cards()));
                lands += 1;
            }
            for side in [StackSide::Left, StackSide::Right] {
                let stack = deck.stack(side);
                assert_eq!(stack.cached_top(), stack.rescan_top(deck.cards()));
            }
        }
        assert!(lands > 10);
    }

    #[test]
    fn test_keeps_landing_after_long_uptime() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);
        deck.clock = 530_000.0;

        let mut started = 0;
        let mut landed = 0;
        for _ in 0..3600 {
            match deck.update(&mut stage, FRAME) {
                Some(DeckEvent::Started { .. }) => started += 1,
                Some(DeckEvent::Landed { .. }) => landed += 1,
                None => {}
            }
        }
        assert!(deck.clock > 530_059.0);
        assert!(landed >= 25, "started {} landed {}", started, landed);
        assert!(started - landed <= 1);
    }

    #[test]
    fn test_direction_flips_when_source_empties() {
        let mut stage = Stage::new();
        let mut config = DeckConfig::default();
        config.card_count = 3;
        config.move_interval = 0.1;
        config.transfer_duration = 0.1;
        let mut deck = deck_with(config, &mut stage);

        assert!(run_until(&mut deck, &mut stage, 600, |d, _| d.stack_sizes() == (0, 3)));
        assert_eq!(deck.source_side(), StackSide::Left);

        assert!(run_until(&mut deck, &mut stage, 600, |d, _| d.transfer().is_some()));
        assert_eq!(deck.source_side(), StackSide::Right);
        assert!(run_until(&mut deck, &mut stage, 600, |d, _| d.stack_sizes() == (3, 0)));
    }

    #[test]
    fn test_only_one_card_in_flight() {
        let mut stage = Stage::new();
        let mut config = DeckConfig::default();
        config.move_interval = 0.05;
        let mut deck = deck_with(config, &mut stage);

        for _ in 0..60 * 20 {
            deck.update(&mut stage, FRAME);
            let in_flight = deck.cards().iter().filter(|c| c.home == CardHome::InFlight).count();
            assert!(in_flight <= 1);
            let (left, right) = deck.stack_sizes();
            assert_eq!(left + right + in_flight, 144);
        }
    }

    #[test]
    fn test_resize_mid_transfer_is_idempotent() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);
        run_until(&mut deck, &mut stage, 120, |d, _| d.transfer().is_some());
        deck.update(&mut stage, 0.5);
        let before = deck.transfer().unwrap().clone();

        let viewport = Viewport::new(1920.0, 1080.0);
        deck.notify_resize(viewport, &mut stage);
        let once = deck.transfer().unwrap().clone();
        deck.notify_resize(viewport, &mut stage);
        let twice = deck.transfer().unwrap().clone();

        assert_eq!(once, twice);
        let right_shift = viewport.anchor([0.7, 0.6]) - Viewport::new(1280.0, 720.0).anchor([0.7, 0.6]);
        assert_relative_eq!(once.destination, before.destination + right_shift, epsilon = 1e-3);
        assert_relative_eq!(deck.stack(StackSide::Left).origin(), viewport.anchor([0.3, 0.6]));

        let top = deck.stack(StackSide::Left).cached_top().unwrap();
        let card = &deck.cards()[top.0];
        let expected = deck.stack(StackSide::Left).to_world(card.local);
        assert_relative_eq!(stage.sprite(card.sprite).unwrap().position(), expected);
    }

    #[test]
    fn test_reset_mid_transfer_discards_it() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);
        run_until(&mut deck, &mut stage, 120, |d, _| d.transfer().is_some());
        deck.update(&mut stage, 0.3);

        deck.reset(&mut stage);
        assert!(deck.transfer().is_none());
        assert_eq!(deck.stack_sizes(), (144, 0));
        assert_eq!(deck.landed_count(), 0);
        assert!(deck.cards().iter().all(|c| c.home == CardHome::Stack(StackSide::Left)));
        assert_eq!(deck.top_card(StackSide::Left), Some(CardId(143)));
    }

    #[test]
    fn test_teardown_destroys_card_sprites() {
        let mut stage = Stage::new();
        let mut deck = deck_with(DeckConfig::default(), &mut stage);
        assert_eq!(stage.len(), 144);
        run_until(&mut deck, &mut stage, 120, |d, _| d.transfer().is_some());

        deck.teardown(&mut stage);
        assert!(stage.is_empty());
        assert!(deck.transfer().is_none());
        assert_eq!(deck.stack_sizes(), (0, 0));
    }
}
