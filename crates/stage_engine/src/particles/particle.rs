//! Particle state and per-type update rules

use crate::core::config::ParticleConfig;
use crate::foundation::collections::SpriteHandle;
use crate::foundation::math::Vec2;
use crate::pooling::PoolKind;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Particle type; also the pool kind its sprite is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Fading ember integrated from velocity
    Base,
    /// Resting flame, never ages out
    Flame,
    /// Ember on a rising spiral path
    Spark,
}

impl PoolKind for ParticleKind {
    fn texture(&self) -> &'static str {
        match self {
            ParticleKind::Base => "fire_particle",
            ParticleKind::Flame => "flame",
            ParticleKind::Spark => "spark",
        }
    }
}

/// Spiral parameters of a spark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spiral {
    /// Point the spiral is centered on; follows emitter relocation
    pub origin: Vec2,
    /// Current angle in radians
    pub angle: f32,
    /// Current radius
    pub radius: f32,
    /// Radius at spawn
    pub base_radius: f32,
    /// Radius added over the full life
    pub growth: f32,
    /// Angular speed in radians per second
    pub speed: f32,
}

/// A live particle
#[derive(Debug, Clone)]
pub struct Particle {
    /// Pooled sprite drawing this particle
    pub sprite: SpriteHandle,
    /// Particle type
    pub kind: ParticleKind,
    /// Current world position
    pub position: Vec2,
    /// Velocity in units per reference frame
    pub velocity: Vec2,
    /// Current uniform scale
    pub scale: f32,
    /// Current opacity
    pub alpha: f32,
    /// Remaining life in seconds; a wrapped phase accumulator for flames
    pub life: f32,
    /// Life at spawn; infinite for flames
    pub max_life: f32,
    /// Spark-only spiral state
    pub spiral: Option<Spiral>,
}

impl Particle {
    /// Advance one tick; returns whether the particle is still alive
    pub fn update(&mut self, delta: f32, emitter: Vec2, config: &ParticleConfig) -> bool {
        match self.kind {
            ParticleKind::Base => self.update_base(delta, config),
            ParticleKind::Flame => self.update_flame(delta, emitter, config),
            ParticleKind::Spark => self.update_spark(delta, config),
        }
    }

    fn update_base(&mut self, delta: f32, config: &ParticleConfig) -> bool {
        let frames = delta * config.reference_fps;
        self.position += self.velocity * frames;
        self.velocity.y *= config.base_damping;
        self.scale += config.base_growth * frames;
        self.life -= delta;
        self.alpha = config.base_alpha * self.life_fraction();
        self.life > 0.0
    }

    fn update_flame(&mut self, delta: f32, emitter: Vec2, config: &ParticleConfig) -> bool {
        self.life += delta;
        // Both flicker terms repeat every 4 turns of the phase; wrapping
        // there keeps the accumulator small without a visible seam
        if config.flame_flicker_rate > 0.0 {
            self.life = self.life.rem_euclid(4.0 * TAU / config.flame_flicker_rate);
        }
        let phase = self.life * config.flame_flicker_rate;
        self.position = emitter;
        self.alpha = config.flame_alpha + config.flame_flicker_alpha * phase.sin();
        // Detuned so the two oscillations never line up
        self.scale = config.flame_scale * (1.0 + config.flame_flicker_scale * (phase * 0.75).sin());
        true
    }

    fn update_spark(&mut self, delta: f32, config: &ParticleConfig) -> bool {
        self.life -= delta;
        let age = self.max_life - self.life;
        let Some(spiral) = self.spiral.as_mut() else {
            return self.life > 0.0;
        };

        spiral.angle += spiral.speed * delta;
        spiral.radius = spiral.base_radius + spiral.growth * (age / self.max_life).clamp(0.0, 1.0);

        let offset = Vec2::new(spiral.angle.cos(), spiral.angle.sin() * 0.5) * spiral.radius;
        let rise = self.velocity.y.abs() * age * config.reference_fps;
        self.position = spiral.origin + offset - Vec2::new(0.0, rise);
        self.alpha = self.life_fraction();
        self.life > 0.0
    }

    /// Remaining life as a fraction of `max_life`, clamped to `0..=1`
    pub fn life_fraction(&self) -> f32 {
        if self.max_life.is_finite() && self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Upward drift of a spark since spawn (zero for other types)
    pub fn rise(&self, config: &ParticleConfig) -> f32 {
        match self.kind {
            ParticleKind::Spark => self.velocity.y.abs() * (self.max_life - self.life) * config.reference_fps,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::Key;
    use approx::assert_relative_eq;

    fn particle(kind: ParticleKind, max_life: f32) -> Particle {
        Particle {
            sprite: SpriteHandle::null(),
            kind,
            position: Vec2::new(100.0, 100.0),
            velocity: Vec2::new(0.5, -1.0),
            scale: 0.5,
            alpha: 1.0,
            life: max_life,
            max_life,
            spiral: None,
        }
    }

    #[test]
    fn test_base_integrates_at_reference_rate() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Base, 1.0);

        p.update(1.0 / 60.0, Vec2::zeros(), &config);
        assert_relative_eq!(p.position, Vec2::new(100.5, 99.0), epsilon = 1e-4);
        assert_relative_eq!(p.velocity.y, -0.98, epsilon = 1e-6);
        assert!(p.scale > 0.5);
    }

    #[test]
    fn test_base_alpha_fades_with_life() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Base, 1.0);

        p.update(0.5, Vec2::zeros(), &config);
        assert_relative_eq!(p.alpha, config.base_alpha * 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_base_dies_at_zero_life() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Base, 0.1);

        assert!(p.update(0.05, Vec2::zeros(), &config));
        assert!(!p.update(0.05, Vec2::zeros(), &config));
    }

    #[test]
    fn test_flame_never_ages_out() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Flame, f32::INFINITY);
        p.life = 0.0;
        let emitter = Vec2::new(320.0, 240.0);

        for _ in 0..10_000 {
            assert!(p.update(0.016, emitter, &config));
        }
        assert_eq!(p.position, emitter);
        assert!(p.life >= 0.0 && p.life < 4.0 * TAU / config.flame_flicker_rate);
        let low = config.flame_alpha - config.flame_flicker_alpha;
        let high = config.flame_alpha + config.flame_flicker_alpha;
        assert!(p.alpha >= low - 1e-5 && p.alpha <= high + 1e-5);
    }

    #[test]
    fn test_flame_keeps_flickering_after_long_uptime() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Flame, f32::INFINITY);
        p.life = 530_000.0;
        let emitter = Vec2::new(320.0, 240.0);

        p.update(1.0 / 60.0, emitter, &config);
        let mut last_alpha = p.alpha;
        for _ in 0..60 {
            p.update(1.0 / 60.0, emitter, &config);
            assert_ne!(p.alpha, last_alpha);
            last_alpha = p.alpha;
        }
    }

    #[test]
    fn test_flame_wrap_is_seamless() {
        let config = ParticleConfig::default();
        let period = 4.0 * TAU / config.flame_flicker_rate;
        let emitter = Vec2::zeros();

        let mut before = particle(ParticleKind::Flame, f32::INFINITY);
        before.life = period - 0.05;
        before.update(0.1, emitter, &config);

        let mut after = particle(ParticleKind::Flame, f32::INFINITY);
        after.life = 0.0;
        after.update(0.05, emitter, &config);

        assert_relative_eq!(before.alpha, after.alpha, epsilon = 1e-4);
        assert_relative_eq!(before.scale, after.scale, epsilon = 1e-4);
    }

    #[test]
    fn test_spark_rise_strictly_increases() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Spark, 1.0);
        p.spiral = Some(Spiral {
            origin: Vec2::new(100.0, 100.0),
            angle: 0.0,
            radius: 10.0,
            base_radius: 10.0,
            growth: 20.0,
            speed: 6.0,
        });

        let mut last_rise = p.rise(&config);
        while p.update(0.016, Vec2::zeros(), &config) {
            let rise = p.rise(&config);
            assert!(rise > last_rise);
            last_rise = rise;
        }
        assert!(p.spiral.unwrap().radius > 10.0);
    }

    #[test]
    fn test_spark_position_is_closed_form() {
        let config = ParticleConfig::default();
        let mut p = particle(ParticleKind::Spark, 1.0);
        let origin = Vec2::new(50.0, 50.0);
        p.spiral = Some(Spiral { origin, angle: 0.0, radius: 0.0, base_radius: 0.0, growth: 0.0, speed: 0.0 });

        p.update(0.25, Vec2::zeros(), &config);
        let expected = origin - Vec2::new(0.0, 1.0 * 0.25 * config.reference_fps);
        assert_relative_eq!(p.position, expected, epsilon = 1e-4);
    }
}
