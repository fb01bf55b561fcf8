//! Configuration system
//!
//! Engine settings live in plain serde structs. The on-disk format follows
//! the file extension: `.toml` or `.ron`.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format implied by `path`'s extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string())),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// A settings struct that can be stored on disk
///
/// Loading runs [`Config::validate`], so a loaded value is always usable.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Check constraints serde cannot express
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Read, parse and validate a config file
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_str_with_format(&contents, path)?;
        log::info!("[CONFIG] Loaded {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text in the format implied by `path`
    fn from_str_with_format<P: AsRef<Path>>(contents: &str, path: P) -> Result<Self, ConfigError> {
        let config: Self = ConfigFormat::from_path(path.as_ref())?.parse(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config in the format implied by `path`
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = ConfigFormat::from_path(path)?.render(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not valid for its format
    #[error("Parse error: {0}")]
    Parse(String),

    /// The value could not be written out
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// The extension names no known format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed fine but is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
