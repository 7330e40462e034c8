//! Server configuration.
//!
//! Maps to a small `config.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1"
//! port = 3000
//! move_interval_ms = 200
//! room_id_max_len = 12
//! max_frame_bytes = 102400
//! ```
//!
//! Missing file or missing keys fall back to defaults.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Minimum interval between accepted moves per connection.
    pub move_interval_ms: u64,
    /// Room identifiers are truncated to this many characters after
    /// normalization.
    pub room_id_max_len: usize,
    /// Incoming frames above this size are dropped unparsed.
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            move_interval_ms: 200,
            room_id_max_len: 12,
            max_frame_bytes: 100 * 1024,
        }
    }
}

/// File wrapper so the settings live under a `[server]` table.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct ConfigFile {
    #[serde(default)]
    server: ServerConfig,
}

impl ServerConfig {
    /// Parses and validates a `config.toml` string.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let file = toml::from_str::<ConfigFile>(content)?;
        file.server.validate()?;
        Ok(file.server)
    }

    /// Loads from a file path, falling back to defaults when the file is
    /// absent or invalid (logged at warn).
    #[must_use]
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("invalid {path}: {e}; using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.bind.is_empty(), "bind address must not be empty");
        anyhow::ensure!(
            self.room_id_max_len >= 1,
            "room id length cap must be positive"
        );
        anyhow::ensure!(
            self.room_id_max_len <= 64,
            "room id length cap too large (max 64)"
        );
        anyhow::ensure!(
            self.max_frame_bytes >= 64,
            "max frame size too small (min 64)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let config = ServerConfig::from_toml(
            "[server]\nport = 4000\nmove_interval_ms = 50\n",
        )
        .expect("valid config");
        assert_eq!(config.port, 4000);
        assert_eq!(config.move_interval_ms, 50);
        assert_eq!(config.room_id_max_len, 12);
    }

    #[test]
    fn test_invalid_room_cap_rejected() {
        let config = ServerConfig {
            room_id_max_len: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_toml_is_defaults() {
        let config = ServerConfig::from_toml("").expect("empty config is fine");
        assert_eq!(config.port, ServerConfig::default().port);
    }
}
