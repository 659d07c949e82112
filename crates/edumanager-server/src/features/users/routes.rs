//! Account API routes
//!
//! - `POST /api/v1/auth/login` - Check credentials, return the account role
//! - `POST /api/v1/users` - Register an account (privileged)

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;

use super::{
    commands::{CreateUserCommand, CreateUserError},
    credentials::CredentialVerifier,
    queries::{AuthenticateError, AuthenticateQuery},
    session::{AuthError, SessionContext},
};
use crate::api::response::{error_response, internal_error, ApiResponse};
use crate::features::FeatureState;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn auth_routes() -> Router<FeatureState> {
    Router::new().route("/login", post(login))
}

pub fn users_routes() -> Router<FeatureState> {
    Router::new().route("/", post(create_user))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Register an account
///
/// # Response
///
/// - `201 Created` - Account created
/// - `400 Bad Request` - Invalid email or password
/// - `403 Forbidden` - Caller may not grant the requested role
/// - `409 Conflict` - Email already registered
#[tracing::instrument(skip(pool, verifier, session, command), fields(by = %session.email))]
async fn create_user(
    State(pool): State<PgPool>,
    State(verifier): State<Arc<dyn CredentialVerifier>>,
    session: SessionContext,
    Json(command): Json<CreateUserCommand>,
) -> Result<Response, UserApiError> {
    session.require_privileged()?;

    let response = super::commands::create::handle(pool, verifier, &session, command).await?;

    tracing::info!(user_id = response.id, "User created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Check an email/password pair
///
/// # Response
///
/// - `200 OK` - `{email, role}`
/// - `401 Unauthorized` - Unknown email or wrong password
#[tracing::instrument(skip(pool, verifier, query))]
async fn login(
    State(pool): State<PgPool>,
    State(verifier): State<Arc<dyn CredentialVerifier>>,
    Json(query): Json<AuthenticateQuery>,
) -> Result<Response, UserApiError> {
    let response = super::queries::authenticate::handle(pool, verifier, query).await?;

    tracing::info!(email = %response.email, role = %response.role, "Login succeeded");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum UserApiError {
    Auth(AuthError),
    Login(AuthenticateError),
    Create(CreateUserError),
}

impl From<AuthError> for UserApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<AuthenticateError> for UserApiError {
    fn from(err: AuthenticateError) -> Self {
        Self::Login(err)
    }
}

impl From<CreateUserError> for UserApiError {
    fn from(err: CreateUserError) -> Self {
        Self::Create(err)
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        match self {
            UserApiError::Auth(err) => err.into_response(),
            UserApiError::Login(AuthenticateError::InvalidCredentials) => {
                AuthError::InvalidCredentials.into_response()
            },
            UserApiError::Login(ref err) => internal_error("login", err),

            UserApiError::Create(
                CreateUserError::EmailValidation(_) | CreateUserError::PasswordValidation(_),
            ) => error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string()),
            UserApiError::Create(CreateUserError::RoleNotGrantable { .. }) => {
                error_response(StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            },
            UserApiError::Create(CreateUserError::DuplicateEmail(_)) => {
                error_response(StatusCode::CONFLICT, "CONFLICT", self.to_string())
            },
            UserApiError::Create(CreateUserError::Database(ref err)) => {
                internal_error("user creation", err)
            },
        }
    }
}

impl std::fmt::Display for UserApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "{}", e),
            Self::Login(e) => write!(f, "{}", e),
            Self::Create(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edumanager_common::UserRole;

    #[test]
    fn test_error_status_codes() {
        let forbidden = UserApiError::Create(CreateUserError::RoleNotGrantable {
            granter: UserRole::Admin,
            role: UserRole::SuperAdmin,
        });
        assert_eq!(forbidden.into_response().status(), StatusCode::FORBIDDEN);

        let conflict = UserApiError::Create(CreateUserError::DuplicateEmail("a@b.c".into()));
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let login = UserApiError::Login(AuthenticateError::InvalidCredentials);
        assert_eq!(login.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_routes_structure() {
        assert!(format!("{:?}", auth_routes()).contains("Router"));
        assert!(format!("{:?}", users_routes()).contains("Router"));
    }
}
