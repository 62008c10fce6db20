//! Error types for click-key-sequencer.
//!
//! Every failure is surfaced as a [`CksError`] and propagated to the caller
//! untouched. Nothing in the crate retries or swallows an error.

use thiserror::Error;

/// Main error type for click-key-sequencer operations.
#[derive(Error, Debug)]
pub enum CksError {
    /// The specified key is invalid or unsupported.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Error parsing a key combination.
    #[error("invalid key combination '{combo}': {reason}")]
    InvalidKeyCombination { combo: String, reason: String },

    /// Error parsing duration string.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Configuration validation error. Raised before any key is injected.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error writing configuration file.
    #[error("failed to save config to '{path}': {reason}")]
    ConfigSave { path: String, reason: String },

    /// The input injector could not deliver a key event.
    #[error("failed to inject {action} of '{key}': {reason}")]
    Injection {
        key: String,
        action: String,
        reason: String,
    },

    /// The pointer event source could not be subscribed to, or died.
    #[error("pointer subscription failed: {0}")]
    Subscription(String),

    /// Error registering or handling hotkey.
    #[error("hotkey error: {0}")]
    Hotkey(String),

    /// The trigger wait was aborted through the cancellation channel.
    #[error("waiting for trigger was cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for click-key-sequencer operations.
pub type Result<T> = std::result::Result<T, CksError>;

impl CksError {
    /// Create a new InvalidKey error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidKeyCombination error.
    pub fn invalid_key_combination(combo: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKeyCombination {
            combo: combo.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidDuration error.
    pub fn invalid_duration(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigSave error.
    pub fn config_save(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigSave {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Injection error.
    pub fn injection(
        key: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Injection {
            key: key.into(),
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Subscription error.
    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription(message.into())
    }

    /// Create a new Hotkey error.
    pub fn hotkey(message: impl Into<String>) -> Self {
        Self::Hotkey(message.into())
    }
}
