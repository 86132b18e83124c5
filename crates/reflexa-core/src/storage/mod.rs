mod config;

pub use config::{
    ChallengeConfig, Config, RecallConfig, RuntimeConfig, SurvivalConfig,
};

use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};

/// Returns `~/.config/reflexa[-dev]/` based on REFLEXA_ENV.
///
/// Set REFLEXA_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REFLEXA_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("reflexa-dev")
    } else {
        base_dir.join("reflexa")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
