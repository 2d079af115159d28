//! Error types for the text categorizer.

use thiserror::Error;

/// Errors raised while training, saving or loading a model.
#[derive(Debug, Error)]
pub enum TextcatError {
    /// No model file exists in the given directory
    #[error("No trained model found at '{path}'")]
    ModelNotFound { path: String },

    /// Training was requested without any usable examples
    #[error("No training examples were provided")]
    EmptyTrainingSet,

    /// Training was requested without any labels
    #[error("At least one label is required to train a model")]
    NoLabels,

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model (de)serialization error
    #[error("Model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for text categorizer operations.
pub type TextcatResult<T> = Result<T, TextcatError>;
