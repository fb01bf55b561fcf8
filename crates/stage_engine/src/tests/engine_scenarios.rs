//! End-to-end engine scenarios
//!
//! Each test drives the public engine surface the way a host would: create
//! scenes, switch between them and pump frames.

use crate::core::config::{ConfigError, EngineConfig};
use crate::deck::StackSide;
use crate::foundation::collections::SceneId;
use crate::scene::{
    CardDeckScene, ContentError, DialogueLine, DialoguePhase, DialogueScene, DialogueScript,
    MenuScene, ParticleDemoScene, SceneError, SceneKind, SceneState,
};
use crate::{Engine, EngineError};

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn engine() -> Engine {
        crate::foundation::logging::init_for_tests();
        let mut config = EngineConfig::default();
        config.seed = Some(3);
        Engine::new(config).unwrap()
    }

    fn run(engine: &mut Engine, seconds: f32) {
        for _ in 0..(seconds * 60.0).round() as usize {
            engine.on_frame(FRAME);
        }
    }

    fn deck_sizes(engine: &Engine, id: SceneId) -> (usize, usize) {
        let scene = engine.scenes().scene_as::<CardDeckScene>(id).unwrap();
        let deck = scene.deck();
        let sizes = deck.borrow().stack_sizes();
        sizes
    }

    fn landed(engine: &Engine, id: SceneId) -> u64 {
        let scene = engine.scenes().scene_as::<CardDeckScene>(id).unwrap();
        let deck = scene.deck();
        let count = deck.borrow().landed_count();
        count
    }

    fn script() -> DialogueScript {
        DialogueScript {
            dialogue: vec![
                DialogueLine { name: "Ada".to_string(), text: "Ready?".to_string() },
                DialogueLine { name: "Brook".to_string(), text: "Always.".to_string() },
            ],
            avatars: Vec::new(),
        }
    }

    #[test]
    fn test_first_card_crosses_over() {
        let mut engine = engine();
        let deck = engine.create_scene(SceneKind::CardDeck);
        engine.switch_to(deck).unwrap();
        assert_eq!(deck_sizes(&engine, deck), (144, 0));

        let mut frames = 0;
        while deck_sizes(&engine, deck) != (143, 1) {
            engine.on_frame(FRAME);
            frames += 1;
            assert!(frames < 60 * 5, "first transfer never landed");
        }
        // One interval of waiting plus one transfer duration
        assert!(frames >= 175 && frames <= 185, "landed after {} frames", frames);
    }

    #[test]
    fn test_recreated_deck_is_canonical() {
        let mut engine = engine();
        let menu = engine.create_scene(SceneKind::Menu);
        let deck = engine.create_scene(SceneKind::CardDeck);

        engine.switch_to(menu).unwrap();
        engine.switch_to(deck).unwrap();
        run(&mut engine, 7.5);
        assert_ne!(deck_sizes(&engine, deck), (144, 0));

        engine.switch_to(menu).unwrap();
        assert_eq!(engine.scenes().state(deck), Some(SceneState::Destroyed));
        engine.switch_to(deck).unwrap();

        let scene = engine.scenes().scene_as::<CardDeckScene>(deck).unwrap();
        let deck_state = scene.deck();
        let deck_state = deck_state.borrow();
        assert_eq!(deck_state.stack_sizes(), (144, 0));
        assert!(deck_state.transfer().is_none());
        assert_eq!(deck_state.source_side(), StackSide::Left);
        assert_eq!(engine.scenes().generation(deck), Some(2));
    }

    #[test]
    fn test_home_preserves_selection() {
        let mut engine = engine();
        let menu = engine.create_scene(SceneKind::Menu);
        let fire = engine.create_scene(SceneKind::ParticleDemo);
        assert_eq!(engine.scenes().home(), Some(menu));

        engine.switch_to(menu).unwrap();
        let selected = {
            let scene = engine.scenes().scene_as::<MenuScene>(menu).unwrap();
            scene.select_next();
            scene.select_next();
            scene.selected()
        };
        engine.switch_to(fire).unwrap();
        run(&mut engine, 1.0);
        assert_eq!(engine.scenes().state(menu), Some(SceneState::Inactive));
        engine.switch_to(menu).unwrap();

        let scene = engine.scenes().scene_as::<MenuScene>(menu).unwrap();
        assert_eq!(scene.selected(), selected);
        assert_eq!(scene.selected_label(), Some("Fire"));
    }

    #[test]
    fn test_no_stale_tickers_after_going_home() {
        let mut engine = engine();
        let menu = engine.create_scene(SceneKind::Menu);
        let others = [
            engine.create_scene(SceneKind::CardDeck),
            engine.create_scene(SceneKind::ParticleDemo),
            engine.create_scene(SceneKind::Dialogue),
        ];

        engine.switch_to(menu).unwrap();
        for id in others {
            engine.switch_to(id).unwrap();
            run(&mut engine, 0.5);
        }
        engine.switch_to(menu).unwrap();

        let scheduler = engine.scheduler();
        assert_eq!(scheduler.len(), scheduler.owner_count(menu));
        for id in others {
            assert_eq!(scheduler.owner_count(id), 0);
            assert_eq!(engine.scenes().state(id), Some(SceneState::Destroyed));
        }
        assert_eq!(engine.stage().len(), engine.config().menu.entries.len());
    }

    #[test]
    fn test_fire_stays_within_cap() {
        let mut engine = engine();
        let fire = engine.create_scene(SceneKind::ParticleDemo);
        engine.switch_to(fire).unwrap();

        for _ in 0..60 * 10 {
            engine.on_frame(FRAME);
            let scene = engine.scenes().scene_as::<ParticleDemoScene>(fire).unwrap();
            let counts = scene.system().borrow().counts();
            assert!(counts.total() <= 10);
            assert_eq!(counts.flame, 1);
        }
    }

    #[test]
    fn test_fire_scene_releases_pool_on_teardown() {
        let mut engine = engine();
        let fire = engine.create_scene(SceneKind::ParticleDemo);
        engine.switch_to(fire).unwrap();
        run(&mut engine, 3.0);
        assert!(!engine.stage().is_empty());

        engine.teardown(fire).unwrap();
        assert!(engine.stage().is_empty());
        assert!(engine.scheduler().is_empty());
        assert_eq!(engine.active_scene(), None);
    }

    #[test]
    fn test_dialogue_failure_is_contained() {
        let mut engine = engine();
        let dialogue = engine.create_scene(SceneKind::Dialogue);
        let deck = engine.create_scene(SceneKind::CardDeck);

        engine.switch_to(dialogue).unwrap();
        let delivered = engine
            .deliver_dialogue(dialogue, Err(ContentError::Unavailable("timed out".to_string())))
            .unwrap();
        assert!(delivered);
        run(&mut engine, 1.0);

        let scene = engine.scenes().scene_as::<DialogueScene>(dialogue).unwrap();
        assert_eq!(scene.phase(), DialoguePhase::Unavailable);
        assert_eq!(engine.scheduler().stats().failures, 0);
        assert_eq!(engine.scheduler().stats().panics, 0);

        // Other scenes are unaffected
        engine.switch_to(deck).unwrap();
        run(&mut engine, 3.5);
        assert_eq!(landed(&engine, deck), 1);
    }

    #[test]
    fn test_dialogue_content_arrives_between_frames() {
        let mut engine = engine();
        let dialogue = engine.create_scene(SceneKind::Dialogue);
        engine.switch_to(dialogue).unwrap();
        run(&mut engine, 0.5);

        engine.deliver_dialogue(dialogue, Ok(script())).unwrap();
        assert!(!engine.deliver_dialogue(dialogue, Ok(script())).unwrap());
        run(&mut engine, 2.0);

        let scene = engine.scenes().scene_as::<DialogueScene>(dialogue).unwrap();
        assert_eq!(scene.phase(), DialoguePhase::Finished);
        assert_eq!(scene.revealed_lines(), 2);
    }

    #[test]
    fn test_deliver_to_wrong_scene() {
        let mut engine = engine();
        let menu = engine.create_scene(SceneKind::Menu);
        engine.switch_to(menu).unwrap();

        let result = engine.deliver_dialogue(menu, Ok(script()));
        assert!(matches!(result, Err(EngineError::Scene(SceneError::NoContentSlot(id))) if id == menu));
    }

    #[test]
    fn test_resize_mid_transfer_is_idempotent() {
        let mut engine = engine();
        let deck = engine.create_scene(SceneKind::CardDeck);
        engine.switch_to(deck).unwrap();
        run(&mut engine, 1.5);

        let transfer_of = |engine: &Engine| {
            let scene = engine.scenes().scene_as::<CardDeckScene>(deck).unwrap();
            let deck = scene.deck();
            let transfer = deck.borrow().transfer().cloned();
            transfer
        };
        assert!(transfer_of(&engine).is_some());

        engine.notify_viewport_resize(1600.0, 900.0);
        let once = transfer_of(&engine);
        engine.notify_viewport_resize(1600.0, 900.0);
        assert_eq!(transfer_of(&engine), once);

        // The transfer still lands on the moved stack
        let moving = once.map(|t| t.card);
        while landed(&engine, deck) == 0 {
            engine.on_frame(FRAME);
        }
        let scene = engine.scenes().scene_as::<CardDeckScene>(deck).unwrap();
        let deck_state = scene.deck();
        let mut deck_state = deck_state.borrow_mut();
        assert_eq!(deck_state.top_card(StackSide::Right), moving);
        let card = &deck_state.cards()[moving.unwrap().0];
        let expected = deck_state.stack(StackSide::Right).to_world(card.local);
        let actual = engine.stage().sprite(card.sprite).unwrap().position();
        assert!((expected - actual).norm() < 1e-3);
        assert!((deck_state.stack(StackSide::Right).origin() - engine.viewport().anchor([0.7, 0.6])).norm() < 1e-3);
    }

    #[test]
    fn test_bad_frame_deltas_do_not_stall_the_deck() {
        let mut engine = engine();
        let deck = engine.create_scene(SceneKind::CardDeck);
        engine.switch_to(deck).unwrap();
        run(&mut engine, 1.5);

        engine.on_frame(f32::INFINITY);
        engine.on_frame(f32::NEG_INFINITY);
        engine.on_frame(f32::NAN);
        engine.on_frame(-1.0);
        run(&mut engine, 2.0);

        assert_eq!(landed(&engine, deck), 1);
        assert!(engine.scheduler().elapsed().is_finite());
    }

    #[test]
    fn test_invalid_resize_is_ignored() {
        let mut engine = engine();
        engine.notify_viewport_resize(0.0, 500.0);
        engine.notify_viewport_resize(f32::NAN, 500.0);
        assert_eq!(engine.viewport().width, 1280.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.deck.card_count = 0;
        assert!(matches!(
            Engine::new(config),
            Err(EngineError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut engine = engine();
        let menu = engine.create_scene(SceneKind::Menu);
        let deck = engine.create_scene(SceneKind::CardDeck);
        engine.switch_to(menu).unwrap();
        engine.switch_to(deck).unwrap();
        run(&mut engine, 1.0);

        engine.shutdown();
        assert!(engine.stage().is_empty());
        assert!(engine.scheduler().is_empty());
        assert_eq!(engine.scenes().state(menu), Some(SceneState::Destroyed));
    }
}
