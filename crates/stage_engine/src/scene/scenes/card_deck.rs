//! Card deck scene

use crate::deck::Deck;
use crate::scene::{Scene, SceneContext, SceneKind};
use crate::scheduler::TickError;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Shows a [`Deck`] trading cards between its stacks
pub struct CardDeckScene {
    deck: Rc<RefCell<Deck>>,
}

impl CardDeckScene {
    /// Lay out a full deck in the left stack
    pub fn new(ctx: &mut SceneContext<'_>) -> Self {
        let rng = ctx.rng(SceneKind::CardDeck);
        let deck = Deck::new(ctx.config.deck.clone(), ctx.viewport, ctx.stage, rng);
        Self { deck: Rc::new(RefCell::new(deck)) }
    }

    /// Shared handle to the deck
    pub fn deck(&self) -> Rc<RefCell<Deck>> {
        Rc::clone(&self.deck)
    }
}

impl Scene for CardDeckScene {
    fn kind(&self) -> SceneKind {
        SceneKind::CardDeck
    }

    fn activate(&mut self, ctx: &mut SceneContext<'_>) {
        self.deck.borrow().set_visible(ctx.stage, true);

        let deck = Rc::clone(&self.deck);
        ctx.scheduler.register(ctx.id, "deck-motion", move |frame| {
            let mut deck = deck.try_borrow_mut().map_err(|_| TickError::StateBusy("deck"))?;
            deck.update(frame.stage, frame.delta);
            Ok(())
        });
    }

    fn deactivate(&mut self, ctx: &mut SceneContext<'_>) {
        self.deck.borrow().set_visible(ctx.stage, false);
    }

    fn teardown(&mut self, ctx: &mut SceneContext<'_>) {
        self.deck.borrow_mut().teardown(ctx.stage);
    }

    fn resize(&mut self, ctx: &mut SceneContext<'_>) {
        self.deck.borrow_mut().notify_resize(ctx.viewport, ctx.stage);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
