//! Sprite pooling
//!
//! Reuses sprites across short-lived effects so steady-state animation does
//! no sprite construction or destruction after warm-up.

pub mod object_pool;

pub use object_pool::{ObjectPool, PoolKind, PoolStats};
