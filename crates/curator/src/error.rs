//! Error types for the curator.

use thiserror::Error;

/// Errors surfaced by curation, training and verification commands.
#[derive(Debug, Error)]
pub enum CuratorError {
    /// Missing or wrong-kind Slack credential
    #[error("{0}")]
    Auth(String),

    /// Channel name could not be resolved
    #[error("Could not find channel {name} in list of channels for this user")]
    NotFound { name: String },

    /// Data file exists but appending was disabled
    #[error("The data file ({path}) exists and append is disabled, please specify another data file")]
    Conflict { path: String },

    /// Data file exists but is empty or unparseable
    #[error("The existing data file ({path}) is invalid, please check the file: {reason}")]
    Corrupt { path: String, reason: String },

    /// Malformed input or missing argument
    #[error("{0}")]
    Validation(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered with `ok: false`
    #[error("Slack API call {method} failed: {error}")]
    SlackApi { method: String, error: String },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Training or verification backend error
    #[error(transparent)]
    Textcat(#[from] textcat::TextcatError),
}

/// Result alias for curator operations.
pub type Result<T> = std::result::Result<T, CuratorError>;
