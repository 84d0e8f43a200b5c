//! Configuration for the windowed inference agent.

use crate::core::resample::TensorLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of samples per window (also the control grid length)
    pub window_size: usize,

    /// Number of channels per sample, fixed for the lifetime of a scheduler
    pub num_signals: usize,

    /// Nominal sample rate of the source stream, used to seed the control
    /// grid's time span
    pub sample_rate_hz: f64,

    /// Minimum stream time between two inference triggers, in seconds
    pub inference_interval_secs: f64,

    /// Order of the flattened tensor handed to the inference engine
    pub tensor_layout: TensorLayout,

    /// Path to the ONNX model file
    pub model_path: Option<PathBuf>,

    /// Path for storing state and run statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("winfer");

        Self {
            window_size: 128,
            num_signals: 2,
            sample_rate_hz: 100.0,
            inference_interval_secs: 0.1,
            tensor_layout: TensorLayout::default(),
            model_path: None,
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("winfer")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Check the construction parameters before building a scheduler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < 2 {
            return Err(ConfigError::Invalid(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if self.num_signals == 0 {
            return Err(ConfigError::Invalid(
                "num_signals must be at least 1".to_string(),
            ));
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !self.inference_interval_secs.is_finite() || self.inference_interval_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "inference_interval_secs must be positive, got {}",
                self.inference_interval_secs
            )));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 128);
        assert_eq!(config.num_signals, 2);
        assert_eq!(config.tensor_layout, TensorLayout::ChannelMajor);
    }

    #[test]
    fn test_validation_rejects_bad_parameters() {
        let mut config = Config::default();
        config.window_size = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.num_signals = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sample_rate_hz = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.inference_interval_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let mut config = Config::default();
        config.tensor_layout = TensorLayout::TimeMajor;
        config.model_path = Some(PathBuf::from("model.onnx"));

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.window_size, config.window_size);
        assert_eq!(parsed.tensor_layout, TensorLayout::TimeMajor);
        assert_eq!(parsed.model_path, config.model_path);
    }
}
