//! Scene Manager - owns scene instances and drives their lifecycle
//!
//! Teardown order is fixed: a scene's tickers are unregistered first and
//! only then is the scene asked to release its sprites, so no callback can
//! observe a half-destroyed scene.

use crate::foundation::collections::{SceneId, SlotMap};
use crate::scene::scenes;
use crate::scene::{ContentSlot, Scene, SceneError, SceneKind, SceneServices};
use std::any::Any;

/// Lifecycle state of one scene id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Registered, never activated
    Uninstantiated,
    /// Currently shown and ticking
    Active,
    /// Cached home scene, hidden and not ticking
    Inactive,
    /// Torn down; the next switch builds it from scratch
    Destroyed,
}

struct SceneSlot {
    kind: SceneKind,
    state: SceneState,
    instance: Option<Box<dyn Scene>>,
    /// Times this id was instantiated
    generation: u32,
}

/// Registry of scenes with at most one active at a time
pub struct SceneManager {
    slots: SlotMap<SceneId, SceneSlot>,
    /// Registration order, for deterministic bulk teardown
    order: Vec<SceneId>,
    active: Option<SceneId>,
    home: Option<SceneId>,
}

impl SceneManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            active: None,
            home: None,
        }
    }

    /// Register a new scene id of `kind`; nothing is built until switched to
    pub fn register(&mut self, kind: SceneKind) -> SceneId {
        let id = self.slots.insert(SceneSlot {
            kind,
            state: SceneState::Uninstantiated,
            instance: None,
            generation: 0,
        });
        self.order.push(id);
        log::debug!("[SCENE] Registered {:?} scene {:?}", kind, id);
        id
    }

    /// Designate `id` as the home scene
    ///
    /// Designating the current home again is a no-op.
    pub fn set_home(&mut self, id: SceneId) -> Result<(), SceneError> {
        self.slot(id)?;
        match self.home {
            Some(current) if current != id => Err(SceneError::HomeAlreadyDesignated { current }),
            _ => {
                self.home = Some(id);
                Ok(())
            }
        }
    }

    /// Make `id` the active scene
    ///
    /// The previous active scene is cached if it is home and torn down
    /// otherwise. Switching to home tears down every other live scene.
    pub fn switch_to(&mut self, id: SceneId, services: &mut SceneServices<'_>) -> Result<(), SceneError> {
        self.slot(id)?;
        if self.active == Some(id) {
            log::debug!("[SCENE] Scene {:?} already active", id);
            return Ok(());
        }

        if self.home == Some(id) {
            let others: Vec<SceneId> = self
                .order
                .iter()
                .copied()
                .filter(|other| *other != id && self.is_live(*other))
                .collect();
            for other in others {
                self.teardown(other, services)?;
            }
        } else if let Some(previous) = self.active {
            if self.home == Some(previous) {
                self.deactivate(previous, services);
            } else {
                self.teardown(previous, services)?;
            }
        }

        let slot = self.slots.get_mut(id).ok_or(SceneError::UnknownScene(id))?;
        let mut ctx = services.context(id);
        if slot.instance.is_none() {
            slot.generation += 1;
            log::info!("[SCENE] Instantiating {:?} scene {:?} (generation {})", slot.kind, id, slot.generation);
            slot.instance = Some(scenes::instantiate(slot.kind, &mut ctx));
        }
        if let Some(scene) = slot.instance.as_mut() {
            scene.activate(&mut ctx);
        }
        slot.state = SceneState::Active;
        self.active = Some(id);
        log::info!("[SCENE] Switched to {:?} scene {:?}", slot.kind, id);
        Ok(())
    }

    fn deactivate(&mut self, id: SceneId, services: &mut SceneServices<'_>) {
        services.scheduler.unregister_owner(id);
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };
        if let Some(scene) = slot.instance.as_mut() {
            scene.deactivate(&mut services.context(id));
        }
        slot.state = SceneState::Inactive;
        if self.active == Some(id) {
            self.active = None;
        }
        log::debug!("[SCENE] Cached {:?} scene {:?}", slot.kind, id);
    }

    /// Tear `id` down: unregister its tickers, then release its resources
    ///
    /// Tearing down a scene that holds no instance is a no-op.
    pub fn teardown(&mut self, id: SceneId, services: &mut SceneServices<'_>) -> Result<(), SceneError> {
        let slot = self.slots.get_mut(id).ok_or(SceneError::UnknownScene(id))?;
        let Some(mut scene) = slot.instance.take() else {
            return Ok(());
        };

        let tickers = services.scheduler.unregister_owner(id);
        scene.teardown(&mut services.context(id));
        slot.state = SceneState::Destroyed;
        if self.active == Some(id) {
            self.active = None;
        }
        log::info!("[SCENE] Tore down {:?} scene {:?} ({} ticker(s) released)", slot.kind, id, tickers);
        Ok(())
    }

    /// Re-layout every instantiated scene for `services.viewport`
    pub fn resize(&mut self, services: &mut SceneServices<'_>) {
        for id in &self.order {
            if let Some(scene) = self.slots.get_mut(*id).and_then(|s| s.instance.as_mut()) {
                scene.resize(&mut services.context(*id));
            }
        }
    }

    /// Tear down every live scene
    pub fn shutdown(&mut self, services: &mut SceneServices<'_>) {
        let live: Vec<SceneId> = self.order.iter().copied().filter(|id| self.is_live(*id)).collect();
        for id in live {
            // Ids come from `order`, so teardown cannot fail
            let _ = self.teardown(id, services);
        }
    }

    fn slot(&self, id: SceneId) -> Result<&SceneSlot, SceneError> {
        self.slots.get(id).ok_or(SceneError::UnknownScene(id))
    }

    fn is_live(&self, id: SceneId) -> bool {
        self.slots.get(id).is_some_and(|s| s.instance.is_some())
    }

    /// Lifecycle state of `id`
    pub fn state(&self, id: SceneId) -> Option<SceneState> {
        self.slots.get(id).map(|s| s.state)
    }

    /// Variant of `id`
    pub fn kind(&self, id: SceneId) -> Option<SceneKind> {
        self.slots.get(id).map(|s| s.kind)
    }

    /// How many times `id` has been instantiated
    pub fn generation(&self, id: SceneId) -> Option<u32> {
        self.slots.get(id).map(|s| s.generation)
    }

    /// Currently active scene
    pub fn active(&self) -> Option<SceneId> {
        self.active
    }

    /// Designated home scene
    pub fn home(&self) -> Option<SceneId> {
        self.home
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> &[SceneId] {
        &self.order
    }

    /// Live instance of `id`
    pub fn scene(&self, id: SceneId) -> Option<&dyn Scene> {
        self.slots.get(id).and_then(|s| s.instance.as_deref())
    }

    /// Live instance of `id` as its concrete type
    pub fn scene_as<T: Any>(&self, id: SceneId) -> Option<&T> {
        self.scene(id).and_then(|scene| scene.as_any().downcast_ref::<T>())
    }

    /// Content slot of a live scene
    pub fn content_slot(&self, id: SceneId) -> Result<ContentSlot, SceneError> {
        let slot = self.slot(id)?;
        let scene = slot.instance.as_deref().ok_or(SceneError::NotInstantiated(id))?;
        scene.content_slot().ok_or(SceneError::NoContentSlot(id))
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
