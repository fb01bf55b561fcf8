//! # Unified Configuration System
//!
//! Every tunable constant of the engine lives here, grouped per subsystem.
//! All structs are `#[serde(default)]`, so a config file only needs to name
//! the values it overrides.
//!
//! ## Configuration Categories
//!
//! - **Viewport / Clock**: initial world size, frame delta clamping
//! - **Particles**: spawn cadence, caps and per-type motion constants
//! - **Deck**: card count, stack layout and transfer timing
//! - **Dialogue / Menu**: layout and pacing of the supporting scenes

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial viewport
    pub viewport: ViewportConfig,
    /// Frame clock settings
    pub clock: ClockConfig,
    /// Particle simulation settings
    pub particles: ParticleConfig,
    /// Card deck settings
    pub deck: DeckConfig,
    /// Dialogue scene settings
    pub dialogue: DialogueConfig,
    /// Menu scene settings
    pub menu: MenuConfig,
    /// Seed for every scene RNG; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            clock: ClockConfig::default(),
            particles: ParticleConfig::default(),
            deck: DeckConfig::default(),
            dialogue: DialogueConfig::default(),
            menu: MenuConfig::default(),
            seed: None,
        }
    }
}

impl Config for EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("viewport.width", self.viewport.width)?;
        positive("viewport.height", self.viewport.height)?;
        positive("clock.max_delta", self.clock.max_delta)?;

        let particles = &self.particles;
        if particles.max_particles == 0 {
            return Err(invalid("particles.max_particles", "must allow at least one particle"));
        }
        positive("particles.reference_fps", particles.reference_fps)?;
        positive("particles.base_interval", particles.base_interval)?;
        positive("particles.spark_interval", particles.spark_interval)?;
        ordered_range("particles.base_life", particles.base_life)?;
        ordered_range("particles.spark_life", particles.spark_life)?;
        ordered_range("particles.base_velocity_x", particles.base_velocity_x)?;
        ordered_range("particles.base_velocity_y", particles.base_velocity_y)?;
        ordered_range("particles.spark_rise", particles.spark_rise)?;
        ordered_range("particles.spark_spiral_speed", particles.spark_spiral_speed)?;
        if particles.base_life[0] <= 0.0 || particles.spark_life[0] <= 0.0 {
            return Err(invalid("particles.*_life", "lifetimes must be positive"));
        }

        let deck = &self.deck;
        if deck.card_count == 0 {
            return Err(invalid("deck.card_count", "a deck needs at least one card"));
        }
        positive("deck.move_interval", deck.move_interval)?;
        positive("deck.transfer_duration", deck.transfer_duration)?;

        positive("dialogue.line_interval", self.dialogue.line_interval)?;
        positive("dialogue.line_height", self.dialogue.line_height)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("expected a positive number, got {}", value) })
    }
}

fn ordered_range(field: &'static str, range: [f32; 2]) -> Result<(), ConfigError> {
    if range[0] <= range[1] {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("min {} exceeds max {}", range[0], range[1]) })
    }
}

/// Initial viewport size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

/// Frame clock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest delta (seconds) a single frame may report
    pub max_delta: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_delta: 0.1 }
    }
}

/// # Particle Simulation Configuration
///
/// Velocities are expressed in world units per reference frame; the
/// simulation scales them by `delta · reference_fps`. Ranges are `[min, max]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Hard cap on live particles of all types
    pub max_particles: usize,
    /// Frame rate velocities are expressed against
    pub reference_fps: f32,
    /// Emitter position as a fraction of the viewport
    pub emitter_anchor: [f32; 2],

    /// Seconds between base particle spawn attempts
    pub base_interval: f32,
    /// Concurrent base particle limit
    pub base_max: usize,
    /// Base particle lifetime range (seconds)
    pub base_life: [f32; 2],
    /// Horizontal spawn jitter around the emitter
    pub base_spread: f32,
    /// Initial horizontal velocity range
    pub base_velocity_x: [f32; 2],
    /// Initial vertical velocity range (negative is up)
    pub base_velocity_y: [f32; 2],
    /// Per-tick multiplier applied to vertical velocity
    pub base_damping: f32,
    /// Scale growth per reference frame
    pub base_growth: f32,
    /// Alpha at spawn, fading linearly to zero
    pub base_alpha: f32,
    /// Scale at spawn
    pub base_scale: f32,

    /// Resting flame scale
    pub flame_scale: f32,
    /// Resting flame alpha
    pub flame_alpha: f32,
    /// Amplitude of the alpha flicker
    pub flame_flicker_alpha: f32,
    /// Relative amplitude of the scale flicker
    pub flame_flicker_scale: f32,
    /// Flicker phase rate (radians per second)
    pub flame_flicker_rate: f32,

    /// Seconds between spark spawn attempts
    pub spark_interval: f32,
    /// Concurrent spark limit
    pub spark_max: usize,
    /// Spark lifetime range (seconds)
    pub spark_life: [f32; 2],
    /// Upward speed range (units per reference frame)
    pub spark_rise: [f32; 2],
    /// Spiral radius at spawn
    pub spark_radius: f32,
    /// Radius added over the spark's full life
    pub spark_radius_growth: f32,
    /// Spiral angular speed range (radians per second)
    pub spark_spiral_speed: [f32; 2],
    /// Spark scale
    pub spark_scale: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particles: 10,
            reference_fps: 60.0,
            emitter_anchor: [0.5, 0.75],

            base_interval: 0.2,
            base_max: 3,
            base_life: [0.8, 1.2],
            base_spread: 20.0,
            base_velocity_x: [-0.5, 0.5],
            base_velocity_y: [-2.0, -1.0],
            base_damping: 0.98,
            base_growth: 0.005,
            base_alpha: 0.9,
            base_scale: 0.5,

            flame_scale: 1.0,
            flame_alpha: 0.85,
            flame_flicker_alpha: 0.15,
            flame_flicker_scale: 0.05,
            flame_flicker_rate: 8.0,

            spark_interval: 0.5,
            spark_max: 4,
            spark_life: [1.0, 1.5],
            spark_rise: [0.8, 1.4],
            spark_radius: 10.0,
            spark_radius_growth: 20.0,
            spark_spiral_speed: [4.0, 8.0],
            spark_scale: 0.3,
        }
    }
}

/// # Card Deck Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Cards created in the left stack
    pub card_count: usize,
    /// Image identifier for card sprites
    pub card_texture: String,
    /// Offset between consecutive stack slots
    pub slot_offset: [f32; 2],
    /// Left stack anchor as a fraction of the viewport
    pub left_anchor: [f32; 2],
    /// Right stack anchor as a fraction of the viewport
    pub right_anchor: [f32; 2],
    /// Seconds between transfer starts
    pub move_interval: f32,
    /// Seconds one transfer takes
    pub transfer_duration: f32,
    /// Height of the arc's control point above the path midpoint
    pub arc_height: f32,
    /// Maximum random offset applied to each landing slot
    pub jitter: f32,
    /// Sprite z-index used while a card is in flight
    pub flight_z: i32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            card_count: 144,
            card_texture: "card".to_string(),
            slot_offset: [0.0, -2.0],
            left_anchor: [0.3, 0.6],
            right_anchor: [0.7, 0.6],
            move_interval: 1.0,
            transfer_duration: 2.0,
            arc_height: 150.0,
            jitter: 4.0,
            flight_z: 10_000,
        }
    }
}

/// # Dialogue Scene Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Seconds between revealed lines
    pub line_interval: f32,
    /// Vertical space taken by one line
    pub line_height: f32,
    /// Empty space above the first line and below the last
    pub margin: f32,
    /// Horizontal anchor of left-side bubbles (fraction of width)
    pub left_x: f32,
    /// Horizontal anchor of right-side bubbles (fraction of width)
    pub right_x: f32,
    /// Exponential easing rate of the scroll offset
    pub scroll_rate: f32,
    /// Rotation speed of the loading indicator (radians per second)
    pub spinner_speed: f32,
    /// Image identifier for speech bubbles
    pub bubble_texture: String,
    /// Image identifier for the loading indicator
    pub loading_texture: String,
    /// Image identifier shown when content could not be obtained
    pub fallback_texture: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            line_interval: 1.5,
            line_height: 90.0,
            margin: 40.0,
            left_x: 0.3,
            right_x: 0.7,
            scroll_rate: 6.0,
            spinner_speed: 3.0,
            bubble_texture: "speech_bubble".to_string(),
            loading_texture: "spinner".to_string(),
            fallback_texture: "content_unavailable".to_string(),
        }
    }
}

/// # Menu Scene Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Entry labels, top to bottom
    pub entries: Vec<String>,
    /// Image identifier for entry buttons
    pub entry_texture: String,
    /// Vertical distance between entries
    pub entry_spacing: f32,
    /// Pulse rate of the selected entry (radians per second)
    pub pulse_rate: f32,
    /// Relative scale amplitude of the pulse
    pub pulse_amount: f32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            entries: vec![
                "Card Deck".to_string(),
                "Dialogue".to_string(),
                "Fire".to_string(),
            ],
            entry_texture: "menu_button".to_string(),
            entry_spacing: 80.0,
            pulse_rate: 4.0,
            pulse_amount: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            seed = 7

            [deck]
            card_count = 12
        "#;
        let config = EngineConfig::from_str_with_format(text, "engine.toml").unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.deck.card_count, 12);
        assert_eq!(config.particles.max_particles, 10);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = EngineConfig::default();
        config.deck.move_interval = 0.5;
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();

        let parsed = EngineConfig::from_str_with_format(&text, "engine.ron").unwrap();
        assert_eq!(parsed.deck.move_interval, 0.5);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = EngineConfig::from_str_with_format("", "engine.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_rejects_empty_deck() {
        let mut config = EngineConfig::default();
        config.deck.card_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "deck.card_count", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = EngineConfig::default();
        config.particles.base_life = [2.0, 1.0];
        assert!(config.validate().is_err());
    }
}
