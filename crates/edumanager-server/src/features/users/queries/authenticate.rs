//! Credential check for login and per-request authentication

use std::sync::Arc;

use edumanager_common::UserRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::users::credentials::CredentialVerifier;

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthenticateQuery {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AuthenticateQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticateQuery")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account has an unknown role '{0}'")]
    UnknownRole(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Unknown email and wrong password are indistinguishable to the caller
#[tracing::instrument(skip(pool, verifier, query), fields(email = %query.email))]
pub async fn handle(
    pool: PgPool,
    verifier: Arc<dyn CredentialVerifier>,
    query: AuthenticateQuery,
) -> Result<AuthenticateResponse, AuthenticateError> {
    let email = query.email.trim();

    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT email, password, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&pool)
            .await?;

    let Some((email, stored, role)) = row else {
        tracing::debug!("Unknown account");
        return Err(AuthenticateError::InvalidCredentials);
    };

    if !verifier.verify(&query.password, &stored) {
        tracing::debug!(scheme = %verifier.scheme(), "Password mismatch");
        return Err(AuthenticateError::InvalidCredentials);
    }

    let role = role
        .parse::<UserRole>()
        .map_err(|_| AuthenticateError::UnknownRole(role))?;

    Ok(AuthenticateResponse { email, role })
}
