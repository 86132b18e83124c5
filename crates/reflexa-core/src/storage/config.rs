//! TOML-based application configuration.
//!
//! Stores the survival-mode tuning:
//! - Continuation budget and per-minute quota
//! - Runtime tick and oracle timeout
//! - Reaction scoring buckets
//! - Challenge layout and seed
//! - Recall mini-game lengths
//!
//! Configuration is stored at `~/.config/reflexa/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::data_dir;
use crate::challenge::ChallengeGenerator;
use crate::clock::QuotaPolicy;
use crate::error::{ConfigError, CoreError, Result};
use crate::runtime::RuntimeSettings;
use crate::scoring::ScoringTable;
use crate::session::SessionSettings;

/// Survival rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalConfig {
    #[serde(default = "default_max_continuations")]
    pub max_continuations: u32,
    #[serde(default = "default_base_quota")]
    pub base_quota: u32,
    #[serde(default = "default_quota_cap")]
    pub quota_cap: u32,
    /// How long inputs stay in the ledger, in seconds of active play.
    #[serde(default = "default_ledger_retention_secs")]
    pub ledger_retention_secs: u64,
}

/// Session driver timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
}

/// Challenge layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    #[serde(default = "default_option_count")]
    pub option_count: usize,
    /// Fixed seed for reproducible sessions (optional).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Recall mini-game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallConfig {
    #[serde(default = "default_start_length")]
    pub start_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/reflexa/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub survival: SurvivalConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub scoring: ScoringTable,
    #[serde(default)]
    pub challenge: ChallengeConfig,
    #[serde(default)]
    pub recall: RecallConfig,
}

// Default functions
fn default_max_continuations() -> u32 {
    2
}
fn default_base_quota() -> u32 {
    30
}
fn default_quota_cap() -> u32 {
    60
}
fn default_ledger_retention_secs() -> u64 {
    300
}
fn default_tick_interval_ms() -> u64 {
    1_000
}
fn default_oracle_timeout_secs() -> u64 {
    120
}
fn default_option_count() -> usize {
    4
}
fn default_start_length() -> usize {
    3
}
fn default_max_length() -> usize {
    20
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            max_continuations: default_max_continuations(),
            base_quota: default_base_quota(),
            quota_cap: default_quota_cap(),
            ledger_retention_secs: default_ledger_retention_secs(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            option_count: default_option_count(),
            seed: None,
        }
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            start_length: default_start_length(),
            max_length: default_max_length(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::Config(ConfigError::UnknownKey(key.to_string()));
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part);

                let new_value = match existing {
                    // Clears optional keys; required keys then fail to deserialize.
                    Some(_) if value == "null" => serde_json::Value::Null,
                    Some(serde_json::Value::Bool(_)) => {
                        let parsed = value.parse::<bool>().map_err(|e| {
                            CoreError::invalid_config(key, format!("'{value}' is not a bool: {e}"))
                        })?;
                        serde_json::Value::Bool(parsed)
                    }
                    Some(serde_json::Value::Number(_)) => {
                        let parsed = value.parse::<u64>().map_err(|e| {
                            CoreError::invalid_config(key, format!("'{value}' is not a number: {e}"))
                        })?;
                        serde_json::Value::Number(parsed.into())
                    }
                    Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                        serde_json::from_str(value)?
                    }
                    Some(serde_json::Value::String(_)) => serde_json::Value::String(value.into()),
                    // Optional keys serialize as null when unset.
                    Some(serde_json::Value::Null) => match value.parse::<u64>() {
                        Ok(n) => serde_json::Value::Number(n.into()),
                        Err(_) => serde_json::Value::String(value.into()),
                    },
                    None => return Err(unknown()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or is
    /// invalid, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate the config at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Write to a sibling temp file and rename it over `path`, so readers
    /// never observe a half-written config.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        let tmp = path.with_extension(format!("toml.{}.tmp", std::process::id()));
        let save_failed = |e: std::io::Error| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        std::fs::write(&tmp, content).map_err(save_failed)?;
        std::fs::rename(&tmp, path).map_err(save_failed)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The result must validate;
    /// nothing is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the updated config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.survival;
        if s.quota_cap < s.base_quota {
            return Err(CoreError::invalid_config(
                "survival.quota_cap",
                format!("must be >= base_quota ({})", s.base_quota),
            ));
        }
        if s.ledger_retention_secs < 120 {
            return Err(CoreError::invalid_config(
                "survival.ledger_retention_secs",
                "must cover at least two minutes of active play",
            ));
        }
        if self.runtime.tick_interval_ms == 0 {
            return Err(CoreError::invalid_config(
                "runtime.tick_interval_ms",
                "must be positive",
            ));
        }
        ChallengeGenerator::new(self.challenge.option_count)?;
        self.scoring.validate()?;
        if self.recall.start_length == 0 || self.recall.max_length < self.recall.start_length {
            return Err(CoreError::invalid_config(
                "recall",
                "start_length must be positive and not exceed max_length",
            ));
        }
        Ok(())
    }

    pub fn session_settings(&self) -> Result<SessionSettings> {
        self.validate()?;
        Ok(SessionSettings {
            quota: QuotaPolicy {
                base_quota: self.survival.base_quota,
                quota_cap: self.survival.quota_cap,
            },
            max_continuations: self.survival.max_continuations,
            ledger_retention: Duration::seconds(self.survival.ledger_retention_secs as i64),
            scoring: self.scoring.clone(),
            generator: ChallengeGenerator::new(self.challenge.option_count)?,
            seed: self.challenge.seed,
        })
    }

    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            tick_interval: std::time::Duration::from_millis(self.runtime.tick_interval_ms),
            oracle_timeout: std::time::Duration::from_secs(self.runtime.oracle_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[survival]\nmax_continuations = 5\n").unwrap();
        assert_eq!(parsed.survival.max_continuations, 5);
        assert_eq!(parsed.survival.base_quota, 30);
        assert_eq!(parsed.scoring, ScoringTable::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("survival.quota_cap").as_deref(), Some("60"));
        assert_eq!(cfg.get("scoring.slow_label").as_deref(), Some("slow"));
        assert_eq!(cfg.get("challenge.seed").as_deref(), Some("null"));
        assert!(cfg.get("survival.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("survival.base_quota", "20").unwrap();
        assert_eq!(cfg.survival.base_quota, 20);
        cfg.set("challenge.seed", "42").unwrap();
        assert_eq!(cfg.challenge.seed, Some(42));
    }

    #[test]
    fn set_null_clears_optional_key() {
        let mut cfg = Config::default();
        cfg.set("challenge.seed", "42").unwrap();
        cfg.set("challenge.seed", "null").unwrap();
        assert_eq!(cfg.challenge.seed, None);
        assert_eq!(cfg.get("challenge.seed").as_deref(), Some("null"));

        assert!(cfg.set("survival.base_quota", "null").is_err());
        assert_eq!(cfg.survival.base_quota, 30);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("survival.nope", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.set("survival.base_quota", "many").is_err());
        assert!(cfg.set("", "1").is_err());
    }

    #[test]
    fn set_keeps_old_value_when_result_is_invalid() {
        let mut cfg = Config::default();
        assert!(cfg.set("survival.base_quota", "90").is_err());
        assert_eq!(cfg.survival.base_quota, 30);
        assert!(cfg.set("challenge.option_count", "9").is_err());
        assert_eq!(cfg.challenge.option_count, 4);
    }

    #[test]
    fn session_settings_follow_config() {
        let mut cfg = Config::default();
        cfg.survival.max_continuations = 3;
        cfg.challenge.seed = Some(5);
        let settings = cfg.session_settings().unwrap();
        assert_eq!(settings.max_continuations, 3);
        assert_eq!(settings.ledger_retention, Duration::minutes(5));
        assert_eq!(settings.seed, Some(5));
        assert_eq!(
            cfg.runtime_settings().tick_interval,
            std::time::Duration::from_secs(1)
        );
    }

    #[test]
    fn save_and_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.survival.quota_cap = 75;
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[survival]\nbase_quota = 50\nquota_cap = 40\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
