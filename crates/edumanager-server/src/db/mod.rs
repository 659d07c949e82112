//! Connection pool and schema management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Schema could not be brought up to date
    #[error("Schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Database configuration is invalid
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Open the shared pool
///
/// The pool keeps `pool_size` connections warm and grows by up to
/// `max_overflow` under load.
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    if config.max_connections() == 0 {
        return Err(DbError::Config("pool must allow at least one connection".into()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections())
        .min_connections(config.min_connections())
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections(),
        min_connections = config.min_connections(),
        "Database connection pool created"
    );

    Ok(pool)
}

/// Create any missing tables
///
/// Safe to call on every start; applied migrations are skipped.
pub async fn ensure_schema(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database schema is up to date");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = false)]
    async fn test_ensure_schema_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT table_name::TEXT FROM information_schema.tables
             WHERE table_schema = 'public'
               AND table_name IN ('controle_materia', 'professores', 'bloco',
                                  'bloco_grupo_relation', 'users')
             ORDER BY table_name",
        )
        .fetch_all(&pool)
        .await?;
        assert_eq!(tables.len(), 5);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_health_check(pool: PgPool) -> sqlx::Result<()> {
        assert!(health_check(&pool).await.is_ok());
        Ok(())
    }
}
