//! Error types for fallcity

use thiserror::Error;

/// Main error type for the city renderer
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error naming the offending field.
    pub fn config(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::Config(format!("{field} {reason}"))
    }
}
