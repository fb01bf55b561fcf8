//! Frame Scheduler / Ticker Registry
//!
//! A shared per-frame callback registry. Every animated component registers
//! one or more callbacks under the id of the scene that owns it; the scene
//! manager removes a whole owner group in one call at teardown.
//!
//! # Ordering and removal
//!
//! - Callbacks run once per frame, in registration order.
//! - Removal is logical while a frame is running: a removed callback is never
//!   invoked again, callbacks that already ran are unaffected, and the list
//!   is compacted once the frame finishes.
//! - Callbacks registered during a frame first run on the next frame.
//!
//! # Error isolation
//!
//! A callback that returns `Err` is logged and keeps its registration; a
//! callback that panics is logged and dropped. Either way the frame moves on
//! to the next callback.

use crate::foundation::collections::{SceneId, SlotMap, TickerHandle};
use crate::render::Stage;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Result of one callback invocation
pub type TickResult = Result<(), TickError>;

/// A registered per-frame callback
pub type TickCallback = Box<dyn FnMut(&mut FrameContext<'_>) -> TickResult>;

/// Failure of a single callback; contained to that callback
#[derive(Error, Debug)]
pub enum TickError {
    /// Shared scene state was already borrowed
    #[error("{0} state is busy")]
    StateBusy(&'static str),

    /// Any other callback failure
    #[error("{0}")]
    Custom(String),
}

/// Per-invocation view handed to a callback
pub struct FrameContext<'a> {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds accumulated across all frames
    pub elapsed: f64,
    /// Index of the current frame, starting at 1
    pub frame: u64,
    /// Sprites to mutate
    pub stage: &'a mut Stage,
    /// The scheduler itself, for (de)registration mid-frame
    pub scheduler: &'a mut FrameScheduler,
    current: TickerHandle,
}

impl FrameContext<'_> {
    /// Handle of the callback being invoked
    pub fn current(&self) -> TickerHandle {
        self.current
    }

    /// Unregister the callback being invoked
    pub fn unregister_self(&mut self) -> bool {
        self.scheduler.unregister(self.current)
    }
}

/// Frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickerStats {
    /// Frames run
    pub frames: u64,
    /// Callback invocations
    pub invocations: u64,
    /// Invocations that returned an error
    pub failures: u64,
    /// Invocations that panicked
    pub panics: u64,
}

struct TickerEntry {
    owner: SceneId,
    label: &'static str,
    /// `None` while the callback is executing
    callback: Option<TickCallback>,
    removed: bool,
}

/// Registry of per-frame callbacks grouped by owning scene
pub struct FrameScheduler {
    entries: SlotMap<TickerHandle, TickerEntry>,
    /// Registration order
    order: Vec<TickerHandle>,
    groups: HashMap<SceneId, Vec<TickerHandle>>,
    /// Snapshot of `order` for the frame in progress (reused buffer)
    frame_order: Vec<TickerHandle>,
    ticking: bool,
    needs_compaction: bool,
    elapsed: f64,
    stats: TickerStats,
}

impl FrameScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            groups: HashMap::new(),
            frame_order: Vec::new(),
            ticking: false,
            needs_compaction: false,
            elapsed: 0.0,
            stats: TickerStats::default(),
        }
    }

    /// Register `callback` under `owner`
    ///
    /// `label` only appears in log messages.
    pub fn register<F>(&mut self, owner: SceneId, label: &'static str, callback: F) -> TickerHandle
    where
        F: FnMut(&mut FrameContext<'_>) -> TickResult + 'static,
    {
        let handle = self.entries.insert(TickerEntry {
            owner,
            label,
            callback: Some(Box::new(callback)),
            removed: false,
        });
        self.order.push(handle);
        self.groups.entry(owner).or_default().push(handle);
        log::debug!("[SCHEDULER] Registered ticker '{}' for scene {:?}", label, owner);
        handle
    }

    /// Unregister one callback
    ///
    /// Returns `false` if the handle is unknown or was already removed.
    pub fn unregister(&mut self, handle: TickerHandle) -> bool {
        let Some(entry) = self.entries.get_mut(handle) else {
            return false;
        };
        if entry.removed {
            return false;
        }
        entry.removed = true;
        entry.callback = None;
        let owner = entry.owner;

        if let Some(group) = self.groups.get_mut(&owner) {
            group.retain(|h| *h != handle);
            if group.is_empty() {
                self.groups.remove(&owner);
            }
        }

        self.needs_compaction = true;
        if !self.ticking {
            self.compact();
        }
        true
    }

    /// Unregister every callback owned by `owner`; returns how many
    pub fn unregister_owner(&mut self, owner: SceneId) -> usize {
        let handles = self.groups.remove(&owner).unwrap_or_default();
        let mut removed = 0;
        for handle in handles {
            if let Some(entry) = self.entries.get_mut(handle) {
                if !entry.removed {
                    entry.removed = true;
                    entry.callback = None;
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            log::debug!("[SCHEDULER] Unregistered {} ticker(s) for scene {:?}", removed, owner);
            self.needs_compaction = true;
            if !self.ticking {
                self.compact();
            }
        }
        removed
    }

    /// Run one frame: invoke every live callback in registration order
    pub fn tick(&mut self, stage: &mut Stage, delta: f32) {
        self.stats.frames += 1;
        self.elapsed += f64::from(delta);
        let frame = self.stats.frames;
        let elapsed = self.elapsed;

        self.ticking = true;
        let mut frame_order = std::mem::take(&mut self.frame_order);
        frame_order.clear();
        frame_order.extend_from_slice(&self.order);

        for &handle in &frame_order {
            let (mut callback, label) = match self.entries.get_mut(handle) {
                Some(entry) if !entry.removed => match entry.callback.take() {
                    Some(callback) => (callback, entry.label),
                    None => continue,
                },
                _ => continue,
            };

            let outcome = {
                let mut ctx = FrameContext {
                    delta,
                    elapsed,
                    frame,
                    stage: &mut *stage,
                    scheduler: &mut *self,
                    current: handle,
                };
                panic::catch_unwind(AssertUnwindSafe(|| callback(&mut ctx)))
            };
            self.stats.invocations += 1;

            let keep = match outcome {
                Ok(Ok(())) => true,
                Ok(Err(err)) => {
                    self.stats.failures += 1;
                    log::error!("[SCHEDULER] Ticker '{}' failed on frame {}: {}", label, frame, err);
                    true
                }
                Err(_) => {
                    self.stats.panics += 1;
                    log::error!("[SCHEDULER] Ticker '{}' panicked on frame {}; removing it", label, frame);
                    false
                }
            };

            if !keep {
                self.unregister(handle);
            } else if let Some(entry) = self.entries.get_mut(handle) {
                // Removed mid-call: the callback is dropped here instead
                if !entry.removed {
                    entry.callback = Some(callback);
                }
            }
        }

        self.frame_order = frame_order;
        self.ticking = false;
        if self.needs_compaction {
            self.compact();
        }
    }

    /// Physically drop removed entries
    fn compact(&mut self) {
        let entries = &mut self.entries;
        self.order.retain(|handle| match entries.get(*handle) {
            Some(entry) if entry.removed => {
                entries.remove(*handle);
                false
            }
            Some(_) => true,
            None => false,
        });
        self.needs_compaction = false;
    }

    /// Whether `handle` is registered and not removed
    pub fn is_registered(&self, handle: TickerHandle) -> bool {
        self.entries.get(handle).is_some_and(|e| !e.removed)
    }

    /// Live callbacks across all owners
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| !e.removed).count()
    }

    /// Whether no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live callbacks owned by `owner`
    pub fn owner_count(&self, owner: SceneId) -> usize {
        self.groups.get(&owner).map_or(0, Vec::len)
    }

    /// Seconds accumulated across all frames
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frame counters
    pub fn stats(&self) -> TickerStats {
        self.stats
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
