//! Domain error types
//!
//! Collaborator failures (analyzer, factory, cipher, morphology, parser)
//! propagate as opaque `anyhow` errors; this enum covers the failures the
//! engine itself can produce.

use thiserror::Error;

/// Main textveil error type
#[derive(Debug, Error)]
pub enum VeilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A category label that is not part of the closed category set
    #[error("Unknown entity category: {0}")]
    UnknownCategory(String),

    /// Chunking errors (invalid budgets)
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}
