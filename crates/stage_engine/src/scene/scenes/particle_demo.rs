//! Fire particle scene

use crate::particles::ParticleSystem;
use crate::scene::{Scene, SceneContext, SceneKind};
use crate::scheduler::TickError;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Shows a [`ParticleSystem`] anchored in the viewport
pub struct ParticleDemoScene {
    system: Rc<RefCell<ParticleSystem>>,
    anchor: [f32; 2],
}

impl ParticleDemoScene {
    /// Create an empty system; the first frame spawns the flame
    pub fn new(ctx: &mut SceneContext<'_>) -> Self {
        let config = ctx.config.particles.clone();
        let anchor = config.emitter_anchor;
        let emitter = ctx.viewport.anchor(anchor);
        let system = ParticleSystem::new(config, emitter, ctx.rng(SceneKind::ParticleDemo));
        Self { system: Rc::new(RefCell::new(system)), anchor }
    }

    /// Shared handle to the particle system
    pub fn system(&self) -> Rc<RefCell<ParticleSystem>> {
        Rc::clone(&self.system)
    }
}

impl Scene for ParticleDemoScene {
    fn kind(&self) -> SceneKind {
        SceneKind::ParticleDemo
    }

    fn activate(&mut self, ctx: &mut SceneContext<'_>) {
        self.system.borrow().set_visible(ctx.stage, true);

        let system = Rc::clone(&self.system);
        ctx.scheduler.register(ctx.id, "fire", move |frame| {
            let mut system = system.try_borrow_mut().map_err(|_| TickError::StateBusy("particles"))?;
            system.update(frame.stage, frame.delta);
            Ok(())
        });
    }

    fn deactivate(&mut self, ctx: &mut SceneContext<'_>) {
        self.system.borrow().set_visible(ctx.stage, false);
    }

    fn teardown(&mut self, ctx: &mut SceneContext<'_>) {
        self.system.borrow_mut().shutdown(ctx.stage);
    }

    fn resize(&mut self, ctx: &mut SceneContext<'_>) {
        let emitter = ctx.viewport.anchor(self.anchor);
        self.system.borrow_mut().relocate_emitter(emitter, ctx.stage);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
