//! Particle system - spawning, aging and pooling of fire particles

use crate::core::config::ParticleConfig;
use crate::foundation::collections::SpriteHandle;
use crate::foundation::math::Vec2;
use crate::particles::particle::{Particle, ParticleKind, Spiral};
use crate::pooling::{ObjectPool, PoolStats};
use crate::render::Stage;
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Live particle counts per type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticleCounts {
    /// Live base particles
    pub base: usize,
    /// Live flames (0 or 1)
    pub flame: usize,
    /// Live sparks
    pub spark: usize,
}

impl ParticleCounts {
    /// Sum over all types
    pub fn total(&self) -> usize {
        self.base + self.flame + self.spark
    }
}

/// Fire emitter with a hard cap on live particles
///
/// Spawn attempts beyond the cap or a per-type limit are dropped silently.
pub struct ParticleSystem {
    config: ParticleConfig,
    emitter: Vec2,
    particles: Vec<Particle>,
    pool: ObjectPool<ParticleKind>,
    base_timer: f32,
    spark_timer: f32,
    rng: StdRng,
}

impl ParticleSystem {
    /// Create an idle system; nothing spawns until the first update
    pub fn new(config: ParticleConfig, emitter: Vec2, rng: StdRng) -> Self {
        let capacity = config.max_particles;
        Self {
            config,
            emitter,
            particles: Vec::with_capacity(capacity),
            pool: ObjectPool::new("PARTICLE"),
            base_timer: 0.0,
            spark_timer: 0.0,
            rng,
        }
    }

    /// Advance the simulation by one frame
    ///
    /// Runs the spawn pass (flame guard, then per-type timers), integrates
    /// every particle, and returns expired particles' sprites to the pool.
    pub fn update(&mut self, stage: &mut Stage, delta: f32) {
        self.spawn_pass(stage, delta);

        let mut index = 0;
        while index < self.particles.len() {
            let particle = &mut self.particles[index];
            let alive = particle.update(delta, self.emitter, &self.config);
            if alive {
                Self::sync_sprite(stage, particle);
                index += 1;
            } else {
                let dead = self.particles.swap_remove(index);
                log::trace!("[PARTICLES] {:?} particle expired", dead.kind);
                self.pool.release(dead.sprite, dead.kind, stage);
            }
        }
    }

    fn spawn_pass(&mut self, stage: &mut Stage, delta: f32) {
        if self.counts().flame == 0 {
            self.spawn(ParticleKind::Flame, stage);
        }

        self.base_timer += delta;
        if self.base_timer >= self.config.base_interval {
            self.base_timer = 0.0;
            self.spawn(ParticleKind::Base, stage);
        }

        self.spark_timer += delta;
        if self.spark_timer >= self.config.spark_interval {
            self.spark_timer = 0.0;
            self.spawn(ParticleKind::Spark, stage);
        }
    }

    /// Attempt to spawn one particle of `kind`
    ///
    /// Returns `false` without side effects when the global cap or the
    /// type's concurrency limit is reached.
    pub fn spawn(&mut self, kind: ParticleKind, stage: &mut Stage) -> bool {
        let counts = self.counts();
        if counts.total() >= self.config.max_particles {
            return false;
        }
        let limit = match kind {
            ParticleKind::Base => self.config.base_max,
            ParticleKind::Flame => 1,
            ParticleKind::Spark => self.config.spark_max,
        };
        let current = match kind {
            ParticleKind::Base => counts.base,
            ParticleKind::Flame => counts.flame,
            ParticleKind::Spark => counts.spark,
        };
        if current >= limit {
            return false;
        }

        let sprite = self.pool.acquire(kind, stage);
        let particle = match kind {
            ParticleKind::Base => self.make_base(sprite),
            ParticleKind::Flame => self.make_flame(sprite),
            ParticleKind::Spark => self.make_spark(sprite),
        };
        stage.update(sprite, |s| {
            s.set_position(particle.position);
            s.set_uniform_scale(particle.scale);
            s.set_alpha(particle.alpha);
            s.set_z_index(z_for(kind));
            s.set_visible(true);
        });
        self.particles.push(particle);
        true
    }

    fn make_base(&mut self, sprite: SpriteHandle) -> Particle {
        let spread = self.config.base_spread;
        let offset_x = if spread > 0.0 { self.rng.gen_range(-spread..=spread) } else { 0.0 };
        let max_life = sample(&mut self.rng, self.config.base_life);
        Particle {
            sprite,
            kind: ParticleKind::Base,
            position: self.emitter + Vec2::new(offset_x, 0.0),
            velocity: Vec2::new(
                sample(&mut self.rng, self.config.base_velocity_x),
                sample(&mut self.rng, self.config.base_velocity_y),
            ),
            scale: self.config.base_scale,
            alpha: self.config.base_alpha,
            life: max_life,
            max_life,
            spiral: None,
        }
    }

    fn make_flame(&mut self, sprite: SpriteHandle) -> Particle {
        Particle {
            sprite,
            kind: ParticleKind::Flame,
            position: self.emitter,
            velocity: Vec2::zeros(),
            scale: self.config.flame_scale,
            alpha: self.config.flame_alpha,
            life: 0.0,
            max_life: f32::INFINITY,
            spiral: None,
        }
    }

    fn make_spark(&mut self, sprite: SpriteHandle) -> Particle {
        let max_life = sample(&mut self.rng, self.config.spark_life);
        let radius = self.config.spark_radius;
        let angle = self.rng.gen_range(0.0..TAU);
        let speed = sample(&mut self.rng, self.config.spark_spiral_speed);
        // Half the spirals turn the other way
        let speed = if self.rng.gen_bool(0.5) { speed } else { -speed };
        Particle {
            sprite,
            kind: ParticleKind::Spark,
            position: self.emitter + Vec2::new(angle.cos(), angle.sin() * 0.5) * radius,
            velocity: Vec2::new(0.0, -sample(&mut self.rng, self.config.spark_rise)),
            scale: self.config.spark_scale,
            alpha: 1.0,
            life: max_life,
            max_life,
            spiral: Some(Spiral {
                origin: self.emitter,
                angle,
                radius,
                base_radius: radius,
                growth: self.config.spark_radius_growth,
                speed,
            }),
        }
    }

    fn sync_sprite(stage: &mut Stage, particle: &Particle) {
        stage.update(particle.sprite, |s| {
            s.set_position(particle.position);
            s.set_uniform_scale(particle.scale);
            s.set_alpha(particle.alpha);
        });
    }

    /// Move the emitter, carrying live particles with it
    ///
    /// Base and spark particles are translated by the delta; the flame is
    /// re-pinned to the new position exactly. Calling this again with the
    /// same position changes nothing.
    pub fn relocate_emitter(&mut self, emitter: Vec2, stage: &mut Stage) {
        let shift = emitter - self.emitter;
        self.emitter = emitter;
        for particle in &mut self.particles {
            match particle.kind {
                ParticleKind::Flame => particle.position = emitter,
                ParticleKind::Base | ParticleKind::Spark => {
                    particle.position += shift;
                    if let Some(spiral) = particle.spiral.as_mut() {
                        spiral.origin += shift;
                    }
                }
            }
            Self::sync_sprite(stage, particle);
        }
    }

    /// Show or hide every live particle
    pub fn set_visible(&self, stage: &mut Stage, visible: bool) {
        for particle in &self.particles {
            stage.update(particle.sprite, |s| s.set_visible(visible));
        }
    }

    /// Return every live particle's sprite to the pool
    pub fn clear(&mut self, stage: &mut Stage) {
        for particle in self.particles.drain(..) {
            self.pool.release(particle.sprite, particle.kind, stage);
        }
    }

    /// Release everything and destroy the pooled sprites
    pub fn shutdown(&mut self, stage: &mut Stage) -> usize {
        self.clear(stage);
        let destroyed = self.pool.drain_all(stage);
        log::debug!("[PARTICLES] Particle system shut down, destroyed {} pooled sprites", destroyed);
        destroyed
    }

    /// Live particle counts per type
    pub fn counts(&self) -> ParticleCounts {
        let mut counts = ParticleCounts::default();
        for particle in &self.particles {
            match particle.kind {
                ParticleKind::Base => counts.base += 1,
                ParticleKind::Flame => counts.flame += 1,
                ParticleKind::Spark => counts.spark += 1,
            }
        }
        counts
    }

    /// Live particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no particles are alive
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current emitter position
    pub fn emitter(&self) -> Vec2 {
        self.emitter
    }

    /// The sprite pool backing this system
    pub fn pool(&self) -> &ObjectPool<ParticleKind> {
        &self.pool
    }

    /// Pool counters
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

fn z_for(kind: ParticleKind) -> i32 {
    match kind {
        ParticleKind::Flame => 0,
        ParticleKind::Base => 1,
        ParticleKind::Spark => 2,
    }
}

/// Uniform sample from `[min, max]`; degenerate ranges return `min`
fn sample(rng: &mut StdRng, range: [f32; 2]) -> f32 {
    if range[0] < range[1] {
        rng.gen_range(range[0]..range[1])
    } else {
        range[0]
    }
}
