//! Particle Simulation
//!
//! A small fire effect built from three particle types:
//!
//! - **Base**: short-lived embers integrated from velocity, fading out
//! - **Flame**: a single resting flame that flickers forever at the emitter
//! - **Spark**: embers following a closed-form rising spiral
//!
//! Particles draw their sprites from an [`ObjectPool`](crate::pooling::ObjectPool)
//! keyed by [`ParticleKind`], so a running fire allocates nothing once warm.

pub mod particle;
pub mod system;

pub use particle::{Particle, ParticleKind, Spiral};
pub use system::{ParticleCounts, ParticleSystem};
