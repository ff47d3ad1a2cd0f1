//! Replay configuration
//!
//! Loaded from TOML; every field has a default so a config file only needs
//! to name what it changes. Command-line flags override file values.
//!
//! ```toml
//! trace_file = "traces/downtown-loop.json"
//! realtime = true
//! speed = 2.0
//! log_level = "debug"
//! broadcast_capacity = 1024
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while loading or validating a replay configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete replay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSON-lines trace to replay
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace_file: Option<PathBuf>,

    /// Honour recorded timestamps instead of replaying as fast as possible
    #[serde(default)]
    pub realtime: bool,

    /// Playback speed multiplier for realtime mode
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Log filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Buffered updates per subscriber before it starts lagging
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_speed() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_broadcast_capacity() -> usize {
    256
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            trace_file: None,
            realtime: false,
            speed: default_speed(),
            log_level: default_log_level(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Values given on the command line; `None`/`false` leaves the file value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub trace_file: Option<PathBuf>,
    pub realtime: bool,
    pub speed: Option<f64>,
    /// Forces the `debug` log level
    pub verbose: bool,
}

impl ReplayConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of file values, then validate
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(trace_file) = overrides.trace_file {
            self.trace_file = Some(trace_file);
        }
        if overrides.realtime {
            self.realtime = true;
        }
        if let Some(speed) = overrides.speed {
            self.speed = speed;
        }
        if overrides.verbose {
            self.log_level = "debug".to_string();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broadcast_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ReplayConfig::from_toml("").unwrap();
        assert_eq!(config, ReplayConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = ReplayConfig::from_toml(
            r#"
trace_file = "traces/downtown-loop.json"
realtime = true
speed = 2.0
log_level = "debug"
broadcast_capacity = 1024
"#,
        )
        .unwrap();

        assert_eq!(
            config.trace_file,
            Some(PathBuf::from("traces/downtown-loop.json"))
        );
        assert!(config.realtime);
        assert_eq!(config.speed, 2.0);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.broadcast_capacity, 1024);
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let err = ReplayConfig::from_toml("speed = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = ReplayConfig::from_toml("broadcast_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = ReplayConfig::from_toml(
            r#"
trace_file = "traces/from-file.json"
speed = 2.0
log_level = "warn"
broadcast_capacity = 64
"#,
        )
        .unwrap();

        config
            .apply_overrides(ConfigOverrides {
                trace_file: Some(PathBuf::from("traces/from-cli.json")),
                realtime: true,
                speed: Some(4.0),
                verbose: true,
            })
            .unwrap();

        assert_eq!(config.trace_file, Some(PathBuf::from("traces/from-cli.json")));
        assert!(config.realtime);
        assert_eq!(config.speed, 4.0);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.broadcast_capacity, 64);
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config =
            ReplayConfig::from_toml("realtime = true\nspeed = 0.5\nlog_level = \"warn\"").unwrap();
        let before = config.clone();

        config.apply_overrides(ConfigOverrides::default()).unwrap();
        assert_eq!(config, before);
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut config = ReplayConfig::default();
        let err = config
            .apply_overrides(ConfigOverrides {
                speed: Some(-1.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "realtime = true").unwrap();

        let config = ReplayConfig::load(file.path()).unwrap();
        assert!(config.realtime);
        assert_eq!(config.speed, 1.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ReplayConfig::load("/nonexistent/vtel-replay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
