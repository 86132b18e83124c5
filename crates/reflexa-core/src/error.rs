//! Core error types for reflexa-core.
//!
//! Gameplay paths never surface these: failures during a session resolve to
//! phase transitions. The types here cover configuration I/O, validation and
//! the collaborator seams (reward oracle, phase table).

use std::path::PathBuf;
use thiserror::Error;

use crate::session::Phase;

/// Core error type for reflexa-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding errors
    #[error("TOML parse error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// TOML encoding errors
    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dotted configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Failures reported by the reward oracle.
///
/// Every variant is handled exactly like a declined continuation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The reward service could not be reached or refused the request.
    #[error("Reward service unavailable: {0}")]
    Unavailable(String),

    /// The request was abandoned before a verdict arrived.
    #[error("Reward request cancelled")]
    Cancelled,
}

/// A phase change that the session state machine does not allow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Illegal transition {transition:?} from phase {from:?}")]
pub struct TransitionError {
    pub from: Phase,
    pub transition: crate::session::Transition,
}

impl CoreError {
    pub(crate) fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Config(ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        })
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
