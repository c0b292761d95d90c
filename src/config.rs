//! Configuration for the enrollment agent.

use crate::core::{DEFAULT_DESCRIPTOR_LEN, DEFAULT_WINDOW_CAPACITY};
use crate::relay::RelayConfig;
use crate::server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the enrollment agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Period between detection ticks
    #[serde(with = "duration_serde")]
    pub capture_interval: Duration,

    /// Number of recent descriptors retained for averaging
    pub window_capacity: usize,

    /// Fixed descriptor length produced by the recognition capability
    pub descriptor_len: usize,

    /// Sign-up server settings
    pub server: ServerConfig,

    /// Relay endpoint the capture agent sends to
    pub relay: RelayConfig,

    /// Path for storing session data
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("face-enroll-agent");

        Self {
            capture_interval: Duration::from_millis(5000),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            descriptor_len: DEFAULT_DESCRIPTOR_LEN,
            server: ServerConfig::default(),
            relay: RelayConfig::default(),
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
            .join("face-enroll-agent")
            .join("config.json")
    }

    /// Path of the persisted session document.
    pub fn session_path(&self) -> PathBuf {
        self.data_path.join("session.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.capture_interval, Duration::from_millis(5000));
        assert_eq!(config.window_capacity, 10);
        assert_eq!(config.descriptor_len, 128);
        assert_eq!(config.server.port, 8443);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.capture_interval, config.capture_interval);
        assert_eq!(parsed.window_capacity, config.window_capacity);
        assert_eq!(parsed.relay.port, config.relay.port);
    }

    #[test]
    fn test_session_path_under_data_dir() {
        let config = Config::default();
        assert!(config.session_path().ends_with("session.json"));
        assert!(config.session_path().starts_with(&config.data_path));
    }
}
