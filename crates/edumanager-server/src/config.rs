//! Configuration management
//!
//! Everything is read from the process environment (after loading `.env`).
//! `DATABASE_URL` has no default: a server without a store cannot start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::users::credentials::CredentialScheme;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8501;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Connections kept open in the pool.
pub const DEFAULT_DATABASE_POOL_SIZE: u32 = 5;

/// Extra connections the pool may open under load.
pub const DEFAULT_DATABASE_MAX_OVERFLOW: u32 = 10;

/// Upper bound for pool size plus overflow.
pub const MAX_DATABASE_CONNECTIONS: u32 = 1000;

/// Default database acquire timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default alert horizon in days for the record list.
pub const DEFAULT_ALERT_DAYS: u32 = 7;

/// Accepted range for the alert horizon.
pub const ALERT_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=30;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub app: AppSettings,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub max_overflow: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Upper bound handed to the pool: steady connections plus overflow
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow)
    }

    pub fn min_connections(&self) -> u32 {
        self.pool_size
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Application behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Horizon used to flag records in the list view
    pub alert_days: u32,
    /// How stored passwords are compared
    pub credential_scheme: CredentialScheme,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let config = Config {
            server: ServerConfig {
                host: lookup("EDU_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: parse_or(&lookup, "EDU_PORT", DEFAULT_SERVER_PORT)?,
                shutdown_timeout_secs: parse_or(
                    &lookup,
                    "EDU_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                )?,
            },
            database: DatabaseConfig {
                url,
                pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", DEFAULT_DATABASE_POOL_SIZE)?,
                max_overflow: parse_or(
                    &lookup,
                    "DATABASE_MAX_OVERFLOW",
                    DEFAULT_DATABASE_MAX_OVERFLOW,
                )?,
                connect_timeout_secs: parse_or(
                    &lookup,
                    "DATABASE_CONNECT_TIMEOUT",
                    DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                )?,
                idle_timeout_secs: parse_or(
                    &lookup,
                    "DATABASE_IDLE_TIMEOUT",
                    DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: parse_or(&lookup, "CORS_ALLOW_CREDENTIALS", true)?,
            },
            app: AppSettings {
                alert_days: parse_or(&lookup, "EDU_ALERT_DAYS", DEFAULT_ALERT_DAYS)?,
                credential_scheme: parse_or(
                    &lookup,
                    "EDU_CREDENTIAL_SCHEME",
                    CredentialScheme::Plain,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("Server port must be greater than 0".into()));
        }

        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "Database pool size must be greater than 0".into(),
            ));
        }

        if self.database.max_connections() > MAX_DATABASE_CONNECTIONS {
            return Err(ConfigError::Invalid(format!(
                "Database pool size plus overflow must not exceed {} (got {} + {})",
                MAX_DATABASE_CONNECTIONS, self.database.pool_size, self.database.max_overflow
            )));
        }

        if !ALERT_DAYS_RANGE.contains(&self.app.alert_days) {
            return Err(ConfigError::Invalid(format!(
                "Alert horizon must be between {} and {} days (got {})",
                ALERT_DAYS_RANGE.start(),
                ALERT_DAYS_RANGE.end(),
                self.app.alert_days
            )));
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));

        let result = Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")]));
        assert!(matches!(result, Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgresql://localhost/edu")]))
                .unwrap();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.database.max_connections(), 15);
        assert_eq!(config.database.min_connections(), 5);
        assert_eq!(config.app.alert_days, 7);
        assert_eq!(config.app.credential_scheme, CredentialScheme::Plain);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/edu"),
            ("DATABASE_POOL_SIZE", "2"),
            ("DATABASE_MAX_OVERFLOW", "3"),
            ("EDU_ALERT_DAYS", "14"),
            ("EDU_CREDENTIAL_SCHEME", "sha256"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();
        assert_eq!(config.database.max_connections(), 5);
        assert_eq!(config.app.alert_days, 14);
        assert_eq!(config.app.credential_scheme, CredentialScheme::Sha256);
        assert_eq!(config.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/edu"),
            ("EDU_PORT", "not-a-port"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "EDU_PORT", .. })
        ));

        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/edu"),
            ("EDU_ALERT_DAYS", "45"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_oversized_pool_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/edu"),
            ("DATABASE_POOL_SIZE", "4294967295"),
            ("DATABASE_MAX_OVERFLOW", "10"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let database = DatabaseConfig {
            url: "postgresql://localhost/edu".into(),
            pool_size: u32::MAX,
            max_overflow: u32::MAX,
            connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
        };
        assert_eq!(database.max_connections(), u32::MAX);
    }
}
