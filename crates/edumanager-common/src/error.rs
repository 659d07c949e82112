//! Error types shared across EduManager crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, EduError>;

/// Main error type for the shared crate
#[derive(Error, Debug)]
pub enum EduError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown status label: '{0}'")]
    UnknownStatus(String),

    #[error("Unknown user role: '{0}'")]
    UnknownRole(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
