//! # Core Engine Module
//!
//! Shared abstractions used throughout the engine. Currently this is the
//! unified configuration system; the low-level utilities live in
//! [`crate::foundation`].

pub mod config;

pub use config::{
    EngineConfig,
    ViewportConfig,
    ClockConfig,
    ParticleConfig,
    DeckConfig,
    DialogueConfig,
    MenuConfig,
    Config,
    ConfigError,
};
