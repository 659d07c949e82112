//! Request-scoped identity
//!
//! Every request carries HTTP Basic credentials that are checked against the
//! `users` table. The resulting [`SessionContext`] is passed to handlers.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edumanager_common::UserRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::credentials::CredentialVerifier;
use super::queries::authenticate::{self, AuthenticateError, AuthenticateQuery};
use crate::api::response::ErrorResponse;

const BASIC_PREFIX: &str = "Basic ";
const CHALLENGE: &str = r#"Basic realm="edumanager""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub email: String,
    pub role: UserRole,
}

impl SessionContext {
    /// Identity used by the command line bootstrap
    pub fn system() -> Self {
        Self {
            email: "system".to_string(),
            role: UserRole::SuperAdmin,
        }
    }

    pub fn require_privileged(&self) -> Result<(), AuthError> {
        if self.role.is_privileged() {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                email: self.email.clone(),
                role: self.role,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredentials,

    #[error("Malformed Authorization header")]
    MalformedCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Role '{role}' is not allowed to modify data")]
    Forbidden { email: String, role: UserRole },

    #[error("Authentication backend error: {0}")]
    Backend(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::InvalidCredentials => {
                let error = ErrorResponse::new("UNAUTHORIZED", self.to_string());
                let mut response = (StatusCode::UNAUTHORIZED, Json(error)).into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
                response
            },
            AuthError::Forbidden { ref email, role } => {
                tracing::warn!(email = %email, role = %role, "Write attempted without privileges");
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            AuthError::Backend(ref cause) => {
                tracing::error!(error = %cause, "Authentication backend failure");
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

/// Decode `Basic base64(email:password)`
pub fn parse_basic_auth(value: &str) -> Result<(String, String), AuthError> {
    let encoded = value
        .strip_prefix(BASIC_PREFIX)
        .ok_or(AuthError::MalformedCredentials)?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::MalformedCredentials)?;
    let text = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;
    let (email, password) = text.split_once(':').ok_or(AuthError::MalformedCredentials)?;
    Ok((email.to_string(), password.to_string()))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
    PgPool: FromRef<S>,
    Arc<dyn CredentialVerifier>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::MalformedCredentials)?;
        let (email, password) = parse_basic_auth(raw)?;

        let pool = PgPool::from_ref(state);
        let verifier = Arc::<dyn CredentialVerifier>::from_ref(state);

        let account = authenticate::handle(pool, verifier, AuthenticateQuery { email, password })
            .await
            .map_err(|err| match err {
                AuthenticateError::InvalidCredentials => AuthError::InvalidCredentials,
                other => AuthError::Backend(other.to_string()),
            })?;

        Ok(SessionContext {
            email: account.email,
            role: account.role,
        })
    }
}
