//! Handle types shared across the engine
//!
//! Every long-lived engine object is addressed through a generational
//! `slotmap` key so a stale handle can never alias a newer object.

pub use slotmap::{SlotMap, Key};

slotmap::new_key_type! {
    /// Handle to a sprite living on the [`Stage`](crate::render::Stage)
    pub struct SpriteHandle;

    /// Handle to a callback registered with the
    /// [`FrameScheduler`](crate::scheduler::FrameScheduler)
    pub struct TickerHandle;

    /// Identifier of a scene registered with the
    /// [`SceneManager`](crate::scene::SceneManager)
    pub struct SceneId;
}
