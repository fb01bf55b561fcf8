//! The four scene variants

pub mod card_deck;
pub mod dialogue;
pub mod menu;
pub mod particle_demo;

pub use card_deck::CardDeckScene;
pub use dialogue::{
    AvatarSide, ContentError, ContentSlot, ContentState, DialogueLine, DialoguePhase,
    DialogueScene, DialogueScript,
};
pub use menu::MenuScene;
pub use particle_demo::ParticleDemoScene;

use crate::scene::{Scene, SceneContext, SceneKind};

/// Build a fresh, hidden instance of `kind`
pub fn instantiate(kind: SceneKind, ctx: &mut SceneContext<'_>) -> Box<dyn Scene> {
    match kind {
        SceneKind::Menu => Box::new(MenuScene::new(ctx)),
        SceneKind::CardDeck => Box::new(CardDeckScene::new(ctx)),
        SceneKind::ParticleDemo => Box::new(ParticleDemoScene::new(ctx)),
        SceneKind::Dialogue => Box::new(DialogueScene::new(ctx)),
    }
}
