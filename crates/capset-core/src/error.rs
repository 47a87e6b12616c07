//! Core error types for capset-core.
//!
//! This module defines the error hierarchy using thiserror. Lookup misses
//! (no parent, unknown category) are not errors; they come back as `None` or
//! empty sets.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for capset-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed node, category or activity input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation against a torn-down manager or an unbound provider
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A single activity's metadata could not be read
    #[error("Metadata for activity '{activity}' is unavailable: {message}")]
    Metadata { activity: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl CoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidState(message.into())
    }

    pub fn metadata(activity: &str, message: impl Into<String>) -> Self {
        CoreError::Metadata {
            activity: activity.to_string(),
            message: message.into(),
        }
    }
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to determine the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Failure reported by a single enablement listener.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
