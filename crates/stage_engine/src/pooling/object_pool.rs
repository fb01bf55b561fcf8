//! Object Pool
//!
//! A reuse cache of sprites keyed by resource kind. Each kind keeps its own
//! ordered idle list; a handle is always either idle in exactly one list or
//! owned by exactly one caller, never both.
//!
//! # Lifecycle
//!
//! ```text
//! acquire(kind) ──► owned ──► release(handle, kind) ──► idle(kind)
//!      ▲                                                   │
//!      └────────────────── reused on next acquire ─────────┘
//!                                     drain(kind) ──► destroyed
//! ```
//!
//! Sprites are only destroyed by [`ObjectPool::drain`] /
//! [`ObjectPool::drain_all`], which scenes call at teardown.

use crate::foundation::collections::SpriteHandle;
use crate::render::Stage;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A resource kind the pool can construct
pub trait PoolKind: Copy + Eq + Hash + Debug {
    /// Image identifier new sprites of this kind are bound to
    fn texture(&self) -> &'static str;
}

/// Statistics for monitoring pool behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Handles handed out by `acquire`
    pub acquired: u64,
    /// Handles accepted back by `release`
    pub released: u64,
    /// Sprites constructed because no idle one was available
    pub constructed: u64,
    /// Sprites destroyed by draining
    pub destroyed: u64,
    /// Releases refused as invariant violations
    pub rejected_releases: u64,
}

/// Per-kind sprite pool
pub struct ObjectPool<K: PoolKind> {
    /// Name used in log messages
    name: String,

    /// Idle handles per kind, reused LIFO
    idle: HashMap<K, Vec<SpriteHandle>>,

    /// Handles currently checked out, with the kind they were acquired as
    owned: HashMap<SpriteHandle, K>,

    /// Sprites ever constructed per kind
    constructed: HashMap<K, usize>,

    stats: PoolStats,
}

impl<K: PoolKind> ObjectPool<K> {
    /// Create an empty pool; it grows lazily
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            idle: HashMap::new(),
            owned: HashMap::new(),
            constructed: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    /// Check out a sprite of `kind`, constructing one if none is idle
    ///
    /// Never fails. The returned sprite is in the canonical default state
    /// (hidden, identity transform).
    pub fn acquire(&mut self, kind: K, stage: &mut Stage) -> SpriteHandle {
        let reused = loop {
            match self.idle.get_mut(&kind).and_then(Vec::pop) {
                Some(handle) if stage.contains(handle) => break Some(handle),
                Some(handle) => {
                    log::warn!("[{} POOL] Dropping idle {:?} sprite {:?} destroyed outside the pool",
                        self.name, kind, handle);
                }
                None => break None,
            }
        };

        let handle = reused.unwrap_or_else(|| {
            *self.constructed.entry(kind).or_insert(0) += 1;
            self.stats.constructed += 1;
            log::trace!("[{} POOL] Constructing {:?} sprite", self.name, kind);
            stage.create_sprite(kind.texture())
        });

        self.owned.insert(handle, kind);
        self.stats.acquired += 1;
        handle
    }

    /// Return a sprite to the idle list of `kind`
    ///
    /// The sprite is reset to its default state first. Releasing a handle
    /// that is not checked out, or under a different kind than it was
    /// acquired as, is logged and ignored; the return value says which
    /// happened.
    pub fn release(&mut self, handle: SpriteHandle, kind: K, stage: &mut Stage) -> bool {
        match self.owned.get(&handle) {
            None => {
                self.stats.rejected_releases += 1;
                log::warn!("[{} POOL] Release of {:?} sprite {:?} that is not owned",
                    self.name, kind, handle);
                return false;
            }
            Some(owned_kind) if *owned_kind != kind => {
                self.stats.rejected_releases += 1;
                log::warn!("[{} POOL] Sprite {:?} acquired as {:?} released as {:?}",
                    self.name, handle, owned_kind, kind);
                return false;
            }
            Some(_) => {}
        }

        self.owned.remove(&handle);
        stage.update(handle, |sprite| sprite.reset());
        self.idle.entry(kind).or_default().push(handle);
        self.stats.released += 1;
        true
    }

    /// Permanently destroy every idle sprite of `kind`
    ///
    /// Owned sprites are untouched. Returns how many sprites were destroyed.
    pub fn drain(&mut self, kind: K, stage: &mut Stage) -> usize {
        let idle = self.idle.remove(&kind).unwrap_or_default();
        let count = idle.len();
        for handle in idle {
            stage.destroy_sprite(handle);
        }
        self.stats.destroyed += count as u64;
        if count > 0 {
            log::debug!("[{} POOL] Drained {} idle {:?} sprites", self.name, count, kind);
        }
        count
    }

    /// Drain every kind
    pub fn drain_all(&mut self, stage: &mut Stage) -> usize {
        let kinds: Vec<K> = self.idle.keys().copied().collect();
        kinds.into_iter().map(|kind| self.drain(kind, stage)).sum()
    }

    /// Whether `handle` is currently checked out
    pub fn is_owned(&self, handle: SpriteHandle) -> bool {
        self.owned.contains_key(&handle)
    }

    /// Idle sprites of `kind`
    pub fn idle_count(&self, kind: K) -> usize {
        self.idle.get(&kind).map_or(0, Vec::len)
    }

    /// Checked-out sprites of `kind`
    pub fn owned_count(&self, kind: K) -> usize {
        self.owned.values().filter(|k| **k == kind).count()
    }

    /// Sprites of `kind` ever constructed by this pool
    pub fn constructed_count(&self, kind: K) -> usize {
        self.constructed.get(&kind).copied().unwrap_or(0)
    }

    /// Total checked-out sprites across kinds
    pub fn total_owned(&self) -> usize {
        self.owned.len()
    }

    /// Lifetime counters
    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Fx {
        Smoke,
        Ember,
    }

    impl PoolKind for Fx {
        fn texture(&self) -> &'static str {
            match self {
                Fx::Smoke => "smoke",
                Fx::Ember => "ember",
            }
        }
    }

    #[test]
    fn test_acquire_constructs_when_empty() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let handle = pool.acquire(Fx::Smoke, &mut stage);
        assert!(pool.is_owned(handle));
        assert_eq!(stage.sprite(handle).unwrap().texture(), "smoke");
        assert_eq!(pool.constructed_count(Fx::Smoke), 1);
    }

    #[test]
    fn test_release_then_acquire_reuses() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let first = pool.acquire(Fx::Ember, &mut stage);
        assert!(pool.release(first, Fx::Ember, &mut stage));
        let second = pool.acquire(Fx::Ember, &mut stage);

        assert_eq!(first, second);
        assert_eq!(pool.constructed_count(Fx::Ember), 1);
        assert_eq!(stage.stats().created, 1);
    }

    #[test]
    fn test_release_resets_sprite() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let handle = pool.acquire(Fx::Ember, &mut stage);
        stage.update(handle, |s| {
            s.set_visible(true);
            s.set_alpha(0.2);
            s.set_tint([1.0, 0.3, 0.0, 1.0]);
            s.set_position(Vec2::new(5.0, 5.0));
        });
        pool.release(handle, Fx::Ember, &mut stage);

        let sprite = stage.sprite(handle).unwrap();
        assert!(!sprite.is_visible());
        assert_eq!(sprite.alpha(), 1.0);
        assert_eq!(sprite.tint(), [1.0; 4]);
        assert_eq!(sprite.position(), Vec2::zeros());
    }

    #[test]
    fn test_double_release_rejected() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let handle = pool.acquire(Fx::Smoke, &mut stage);
        assert!(pool.release(handle, Fx::Smoke, &mut stage));
        assert!(!pool.release(handle, Fx::Smoke, &mut stage));
        assert_eq!(pool.idle_count(Fx::Smoke), 1);
        assert_eq!(pool.stats().rejected_releases, 1);
    }

    #[test]
    fn test_kind_crossing_rejected() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let handle = pool.acquire(Fx::Smoke, &mut stage);
        assert!(!pool.release(handle, Fx::Ember, &mut stage));
        assert!(pool.is_owned(handle));
        assert_eq!(pool.idle_count(Fx::Ember), 0);
    }

    #[test]
    fn test_drain_destroys_only_idle() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let kept = pool.acquire(Fx::Smoke, &mut stage);
        let returned = pool.acquire(Fx::Smoke, &mut stage);
        pool.release(returned, Fx::Smoke, &mut stage);

        assert_eq!(pool.drain(Fx::Smoke, &mut stage), 1);
        assert!(stage.contains(kept));
        assert!(!stage.contains(returned));
        assert_eq!(pool.idle_count(Fx::Smoke), 0);
    }

    #[test]
    fn test_idle_sprite_destroyed_elsewhere_is_skipped() {
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");

        let handle = pool.acquire(Fx::Smoke, &mut stage);
        pool.release(handle, Fx::Smoke, &mut stage);
        stage.destroy_sprite(handle);

        let fresh = pool.acquire(Fx::Smoke, &mut stage);
        assert_ne!(fresh, handle);
        assert!(stage.contains(fresh));
    }

    #[test]
    fn test_random_sequences_conserve_handles() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut stage = Stage::new();
        let mut pool = ObjectPool::new("test");
        let mut held: Vec<(SpriteHandle, Fx)> = Vec::new();
        let mut previous_total = 0;

        for _ in 0..2_000 {
            let kind = if rng.gen_bool(0.5) { Fx::Smoke } else { Fx::Ember };
            if held.is_empty() || rng.gen_bool(0.55) {
                let handle = pool.acquire(kind, &mut stage);
                assert!(held.iter().all(|(h, _)| *h != handle), "handle owned twice");
                held.push((handle, kind));
            } else {
                let index = rng.gen_range(0..held.len());
                let (handle, kind) = held.swap_remove(index);
                assert!(pool.release(handle, kind, &mut stage));
            }

            let total: usize = [Fx::Smoke, Fx::Ember]
                .iter()
                .map(|k| pool.owned_count(*k) + pool.idle_count(*k))
                .sum();
            let constructed: usize = [Fx::Smoke, Fx::Ember]
                .iter()
                .map(|k| pool.constructed_count(*k))
                .sum();
            assert!(total >= previous_total);
            assert!(total <= constructed);
            previous_total = total;

            let unique: HashSet<SpriteHandle> = held.iter().map(|(h, _)| *h).collect();
            assert_eq!(unique.len(), held.len());
        }
    }
}
