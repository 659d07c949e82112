//! Server-level error types
//!
//! Request handlers use per-feature error enums; this type covers process
//! startup and the CLI entry points.

use thiserror::Error;

use crate::{config::ConfigError, db::DbError};

/// Result type alias for server operations
pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] edumanager_common::EduError),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DbError::Sqlx(err))
    }
}
