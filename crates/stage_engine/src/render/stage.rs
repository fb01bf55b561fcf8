//! Stage - owner of every sprite the engine draws
//!
//! The stage is the visual-element factory the rest of the engine builds
//! on: it creates sprites from an image identifier and hands back
//! generational [`SpriteHandle`]s. Touching a destroyed sprite is an
//! invariant violation that is logged and ignored, never a crash.

use crate::foundation::collections::{SlotMap, SpriteHandle};
use crate::render::sprite::{Sprite, SpriteDirty};

/// Lifetime counters for the stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Sprites created since the stage was made
    pub created: u64,
    /// Sprites destroyed since the stage was made
    pub destroyed: u64,
    /// Updates addressed to sprites that no longer exist
    pub stale_updates: u64,
}

/// Store of all live sprites
pub struct Stage {
    sprites: SlotMap<SpriteHandle, Sprite>,
    stats: StageStats,
}

impl Stage {
    /// Create an empty stage
    pub fn new() -> Self {
        Self {
            sprites: SlotMap::with_key(),
            stats: StageStats::default(),
        }
    }

    /// Create a hidden sprite bound to `texture`
    pub fn create_sprite(&mut self, texture: &str) -> SpriteHandle {
        self.stats.created += 1;
        self.sprites.insert(Sprite::new(texture))
    }

    /// Destroy a sprite; returns `false` (and logs) if it was already gone
    pub fn destroy_sprite(&mut self, handle: SpriteHandle) -> bool {
        if self.sprites.remove(handle).is_some() {
            self.stats.destroyed += 1;
            true
        } else {
            log::warn!("[STAGE] Attempted to destroy unknown sprite {:?}", handle);
            false
        }
    }

    /// Whether `handle` still refers to a live sprite
    pub fn contains(&self, handle: SpriteHandle) -> bool {
        self.sprites.contains_key(handle)
    }

    /// Read a sprite
    pub fn sprite(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.sprites.get(handle)
    }

    /// Mutate a sprite through `f`
    ///
    /// Returns `false` and logs a warning if the sprite was destroyed; the
    /// caller carries on with its frame.
    pub fn update(&mut self, handle: SpriteHandle, f: impl FnOnce(&mut Sprite)) -> bool {
        match self.sprites.get_mut(handle) {
            Some(sprite) => {
                f(sprite);
                true
            }
            None => {
                self.stats.stale_updates += 1;
                log::warn!("[STAGE] Ignoring update to destroyed sprite {:?}", handle);
                false
            }
        }
    }

    /// Number of live sprites
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether the stage holds no sprites
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Number of live sprites currently visible
    pub fn visible_count(&self) -> usize {
        self.sprites.values().filter(|s| s.is_visible()).count()
    }

    /// Lifetime counters
    pub fn stats(&self) -> StageStats {
        self.stats
    }

    /// Visible sprites in draw order (z-index; ties keep slot order)
    pub fn draw_order(&self) -> Vec<SpriteHandle> {
        let mut visible: Vec<(SpriteHandle, i32)> = self
            .sprites
            .iter()
            .filter(|(_, s)| s.is_visible())
            .map(|(h, s)| (h, s.z_index()))
            .collect();
        visible.sort_by_key(|&(_, z)| z);
        visible.into_iter().map(|(h, _)| h).collect()
    }

    /// Hand every sprite with pending changes to `sync`, clearing its flags
    ///
    /// Returns how many sprites were synced.
    pub fn sync_dirty(&mut self, mut sync: impl FnMut(SpriteHandle, &Sprite, SpriteDirty)) -> usize {
        let mut synced = 0;
        for (handle, sprite) in self.sprites.iter_mut() {
            let dirty = sprite.take_dirty();
            if !dirty.is_empty() {
                sync(handle, sprite, dirty);
                synced += 1;
            }
        }
        synced
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
