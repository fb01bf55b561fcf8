//! Menu scene - the home screen

use crate::core::config::MenuConfig;
use crate::foundation::collections::SpriteHandle;
use crate::foundation::math::{Vec2, Viewport};
use crate::render::Stage;
use crate::scene::{Scene, SceneContext, SceneKind};
use crate::scheduler::TickError;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

struct MenuState {
    entries: Vec<SpriteHandle>,
    selected: usize,
    /// Pulse phase of the selected entry, radians
    phase: f32,
}

/// Vertical list of entries with a pulsing selection
///
/// The selection survives deactivation, so returning home lands on the
/// entry that was last chosen.
pub struct MenuScene {
    config: MenuConfig,
    state: Rc<RefCell<MenuState>>,
}

impl MenuScene {
    /// Create one hidden sprite per configured entry
    pub fn new(ctx: &mut SceneContext<'_>) -> Self {
        let config = ctx.config.menu.clone();
        let entries = config
            .entries
            .iter()
            .map(|_| ctx.stage.create_sprite(&config.entry_texture))
            .collect();
        let scene = Self {
            config,
            state: Rc::new(RefCell::new(MenuState { entries, selected: 0, phase: 0.0 })),
        };
        scene.layout(ctx.stage, ctx.viewport);
        scene
    }

    fn layout(&self, stage: &mut Stage, viewport: Viewport) {
        let state = self.state.borrow();
        let center = viewport.center();
        let middle = (state.entries.len().saturating_sub(1)) as f32 / 2.0;
        for (index, sprite) in state.entries.iter().enumerate() {
            let y = center.y + (index as f32 - middle) * self.config.entry_spacing;
            stage.update(*sprite, |s| s.set_position(Vec2::new(center.x, y)));
        }
    }

    fn set_visible(&self, stage: &mut Stage, visible: bool) {
        for sprite in &self.state.borrow().entries {
            stage.update(*sprite, |s| {
                s.set_visible(visible);
                s.set_uniform_scale(1.0);
            });
        }
    }

    /// Index of the selected entry
    pub fn selected(&self) -> usize {
        self.state.borrow().selected
    }

    /// Label of the selected entry
    pub fn selected_label(&self) -> Option<&str> {
        self.config.entries.get(self.selected()).map(String::as_str)
    }

    /// Move the selection down, wrapping around
    pub fn select_next(&self) {
        let mut state = self.state.borrow_mut();
        let count = state.entries.len();
        if count > 0 {
            state.selected = (state.selected + 1) % count;
            state.phase = 0.0;
        }
    }

    /// Move the selection up, wrapping around
    pub fn select_previous(&self) {
        let mut state = self.state.borrow_mut();
        let count = state.entries.len();
        if count > 0 {
            state.selected = (state.selected + count - 1) % count;
            state.phase = 0.0;
        }
    }
}

impl Scene for MenuScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Menu
    }

    fn activate(&mut self, ctx: &mut SceneContext<'_>) {
        self.set_visible(ctx.stage, true);

        let state = Rc::clone(&self.state);
        let rate = self.config.pulse_rate;
        let amount = self.config.pulse_amount;
        ctx.scheduler.register(ctx.id, "menu-pulse", move |frame| {
            let mut state = state.try_borrow_mut().map_err(|_| TickError::StateBusy("menu"))?;
            state.phase += frame.delta * rate;
            let pulse = 1.0 + amount * state.phase.sin();
            for (index, sprite) in state.entries.iter().enumerate() {
                let scale = if index == state.selected { pulse } else { 1.0 };
                frame.stage.update(*sprite, |s| s.set_uniform_scale(scale));
            }
            Ok(())
        });
    }

    fn deactivate(&mut self, ctx: &mut SceneContext<'_>) {
        self.set_visible(ctx.stage, false);
    }

    fn teardown(&mut self, ctx: &mut SceneContext<'_>) {
        for sprite in self.state.borrow_mut().entries.drain(..) {
            ctx.stage.destroy_sprite(sprite);
        }
    }

    fn resize(&mut self, ctx: &mut SceneContext<'_>) {
        self.layout(ctx.stage, ctx.viewport);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::foundation::collections::SceneId;
    use slotmap::KeyData;
    use crate::scheduler::FrameScheduler;
    use approx::assert_relative_eq;

    #[test]
    fn test_selection_wraps() {
        let config = EngineConfig::default();
        let mut stage = Stage::new();
        let mut scheduler = FrameScheduler::new();
        let mut ctx = SceneContext {
            id: SceneId::from(KeyData::from_ffi(1)),
            stage: &mut stage,
            scheduler: &mut scheduler,
            viewport: Viewport::new(1280.0, 720.0),
            config: &config,
        };
        let menu = MenuScene::new(&mut ctx);

        assert_eq!(menu.selected_label(), Some("Card Deck"));
        menu.select_previous();
        assert_eq!(menu.selected(), 2);
        menu.select_next();
        menu.select_next();
        assert_eq!(menu.selected_label(), Some("Dialogue"));
    }

    #[test]
    fn test_pulse_only_scales_selected_entry() {
        let config = EngineConfig::default();
        let mut stage = Stage::new();
        let mut scheduler = FrameScheduler::new();
        let id = SceneId::from(KeyData::from_ffi(1));
        let mut menu = {
            let mut ctx = SceneContext {
                id,
                stage: &mut stage,
                scheduler: &mut scheduler,
                viewport: Viewport::new(1280.0, 720.0),
                config: &config,
            };
            let mut menu = MenuScene::new(&mut ctx);
            menu.activate(&mut ctx);
            menu
        };
        menu.select_next();

        scheduler.tick(&mut stage, 0.1);
        let entries = menu.state.borrow().entries.clone();
        assert!(stage.sprite(entries[1]).unwrap().scale().x > 1.0);
        assert_relative_eq!(stage.sprite(entries[0]).unwrap().scale().x, 1.0);
        assert!(stage.sprite(entries[0]).unwrap().is_visible());

        let mut ctx = SceneContext {
            id,
            stage: &mut stage,
            scheduler: &mut scheduler,
            viewport: Viewport::new(1280.0, 720.0),
            config: &config,
        };
        menu.teardown(&mut ctx);
        assert!(stage.is_empty());
    }

    #[test]
    fn test_entries_centered_vertically() {
        let config = EngineConfig::default();
        let mut stage = Stage::new();
        let mut scheduler = FrameScheduler::new();
        let mut ctx = SceneContext {
            id: SceneId::from(KeyData::from_ffi(1)),
            stage: &mut stage,
            scheduler: &mut scheduler,
            viewport: Viewport::new(1000.0, 600.0),
            config: &config,
        };
        let menu = MenuScene::new(&mut ctx);

        let entries = menu.state.borrow().entries.clone();
        let middle = stage.sprite(entries[1]).unwrap().position();
        assert_relative_eq!(middle, Vec2::new(500.0, 300.0));
        let top = stage.sprite(entries[0]).unwrap().position();
        assert_relative_eq!(top.y, 220.0);
    }
}
