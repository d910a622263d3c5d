//! Configuration resolution for `SoulAce`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/soulace/settings.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete `SoulAce` server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// Listener and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            database_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// Presence channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Outbound events buffered per connection before new ones are dropped.
    pub outbound_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: 64,
        }
    }
}

/// Matching behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Message returned with a 404 when nobody matches.
    pub fallback_message: String,
    /// How many times a lost listener claim is retried with the next candidate.
    pub listener_claim_attempts: u32,
    /// Mood history entries returned with the current mood.
    pub mood_history_limit: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fallback_message:
                "No one is available right now. You can talk to our AI companion in the meantime."
                    .to_string(),
            listener_claim_attempts: 3,
            mood_history_limit: 20,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let global = global_config_path().filter(|p| p.exists());
    let mut config = load_layers(global.as_deref(), explicit)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("soulace").join("settings.json"))
}

/// Default database location when none is configured.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("soulace").join("soulace.db"))
}

/// Stack the file layers over the defaults. A file only overrides the keys
/// it actually contains.
fn load_layers(global: Option<&Path>, explicit: Option<&Path>) -> Result<Config> {
    let mut merged = serde_json::to_value(Config::default())
        .map_err(|e| Error::Config(format!("Failed to encode defaults: {e}")))?;

    for path in [global, explicit].into_iter().flatten() {
        merge_value(&mut merged, read_config_value(path)?);
    }

    serde_json::from_value(merged)
        .map_err(|e| Error::Config(format!("Invalid configuration: {e}")))
}

fn read_config_value(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Recursive object merge; non-object values in `overlay` replace `base`.
fn merge_value(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("SOULACE_ADDR") {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("SOULACE_DB_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("SOULACE_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Ok(val) = std::env::var("SOULACE_RELAY_BUFFER") {
        if let Ok(n) = val.parse() {
            config.relay.outbound_buffer = n;
        }
    }
    if let Ok(val) = std::env::var("SOULACE_LISTENER_CLAIM_ATTEMPTS") {
        if let Ok(n) = val.parse() {
            config.matching.listener_claim_attempts = n;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_relay_buffer_is_64() {
        let config = Config::default();
        assert_eq!(config.relay.outbound_buffer, 64);
        assert_eq!(config.matching.listener_claim_attempts, 3);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"addr": "127.0.0.1:9000"}, "matching": {"mood_history_limit": 5}}"#,
        )
        .unwrap();

        let config = load_layers(None, Some(&path)).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.matching.mood_history_limit, 5);
        assert_eq!(config.matching.listener_claim_attempts, 3);
        assert_eq!(config.relay.outbound_buffer, 64);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_layers(None, Some(&path)), Err(Error::Config(_))));
    }

    #[test]
    fn explicit_file_keeps_global_values_it_does_not_mention() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.json");
        let explicit = dir.path().join("explicit.json");
        std::fs::write(
            &global,
            r#"{"server": {"addr": "127.0.0.1:9000", "database_path": "/data/a.db"}, "relay": {"outbound_buffer": 8}}"#,
        )
        .unwrap();
        std::fs::write(&explicit, r#"{"matching": {"mood_history_limit": 5}}"#).unwrap();

        let config = load_layers(Some(&global), Some(&explicit)).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.server.database_path, Some(PathBuf::from("/data/a.db")));
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.relay.outbound_buffer, 8);
        assert_eq!(config.matching.mood_history_limit, 5);
        assert_eq!(config.matching.listener_claim_attempts, 3);
    }

    #[test]
    fn explicit_file_wins_over_global_for_shared_keys() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.json");
        let explicit = dir.path().join("explicit.json");
        std::fs::write(&global, r#"{"server": {"addr": "127.0.0.1:9000", "log_level": "debug"}}"#)
            .unwrap();
        std::fs::write(&explicit, r#"{"server": {"addr": "127.0.0.1:9100"}}"#).unwrap();

        let config = load_layers(Some(&global), Some(&explicit)).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9100");
        assert_eq!(config.server.log_level, "debug");
    }
}
