//! Register a user account

use std::sync::Arc;

use edumanager_common::UserRole;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::{
    error_helpers::map_unique_violation,
    validation::{EmailValidationError, PasswordValidationError},
    validate_email, validate_password,
};
use crate::features::users::{credentials::CredentialVerifier, session::SessionContext};

#[derive(Clone, Serialize, Deserialize)]
pub struct CreateUserCommand {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl std::fmt::Debug for CreateUserCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserCommand")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("Email validation failed: {0}")]
    EmailValidation(#[from] EmailValidationError),

    #[error("Password validation failed: {0}")]
    PasswordValidation(#[from] PasswordValidationError),

    #[error("Role '{granter}' cannot create accounts with role '{role}'")]
    RoleNotGrantable { granter: UserRole, role: UserRole },

    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateUserCommand {
    pub fn validate(&self, granter: UserRole) -> Result<(), CreateUserError> {
        if !granter.can_grant(self.role) {
            return Err(CreateUserError::RoleNotGrantable {
                granter,
                role: self.role,
            });
        }
        validate_email(self.email.trim())?;
        validate_password(&self.password)?;
        Ok(())
    }
}

#[tracing::instrument(
    skip(pool, verifier, session, command),
    fields(email = %command.email, role = %command.role, by = %session.email)
)]
pub async fn handle(
    pool: PgPool,
    verifier: Arc<dyn CredentialVerifier>,
    session: &SessionContext,
    command: CreateUserCommand,
) -> Result<CreateUserResponse, CreateUserError> {
    command.validate(session.role)?;

    let email = command.email.trim().to_string();
    let stored = verifier.hash(&command.password);

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&email)
    .bind(&stored)
    .bind(command.role.as_str())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        map_unique_violation(e, CreateUserError::DuplicateEmail(email.clone()), CreateUserError::Database)
    })?;

    tracing::info!(user_id = id, scheme = %verifier.scheme(), "User created");

    Ok(CreateUserResponse {
        id,
        email,
        role: command.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::credentials::CredentialScheme;

    fn command(email: &str, role: UserRole) -> CreateUserCommand {
        CreateUserCommand {
            email: email.into(),
            password: "segredo123".into(),
            role,
        }
    }

    fn session(role: UserRole) -> SessionContext {
        SessionContext {
            email: "quem@escola.br".into(),
            role,
        }
    }

    #[test]
    fn test_role_rules() {
        let admin = UserRole::Admin;
        assert!(command("a@escola.br", UserRole::Reader).validate(admin).is_ok());
        assert!(command("a@escola.br", UserRole::Admin).validate(admin).is_ok());
        assert!(matches!(
            command("a@escola.br", UserRole::SuperAdmin).validate(admin),
            Err(CreateUserError::RoleNotGrantable { .. })
        ));
        assert!(command("a@escola.br", UserRole::SuperAdmin)
            .validate(UserRole::SuperAdmin)
            .is_ok());
        assert!(matches!(
            command("a@escola.br", UserRole::Reader).validate(UserRole::Reader),
            Err(CreateUserError::RoleNotGrantable { .. })
        ));
    }

    #[test]
    fn test_invalid_email() {
        assert!(matches!(
            command("not-an-email", UserRole::Reader).validate(UserRole::SuperAdmin),
            Err(CreateUserError::EmailValidation(_))
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", command("a@escola.br", UserRole::Reader));
        assert!(!rendered.contains("segredo123"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_create_hashes_and_rejects_duplicates(pool: PgPool) -> sqlx::Result<()> {
        let verifier = CredentialScheme::Sha256.verifier();
        let created = handle(
            pool.clone(),
            verifier.clone(),
            &session(UserRole::SuperAdmin),
            command("ana@escola.br", UserRole::Admin),
        )
        .await
        .unwrap();
        assert_eq!(created.role, UserRole::Admin);

        let (stored,): (String,) = sqlx::query_as("SELECT password FROM users WHERE id = $1")
            .bind(created.id)
            .fetch_one(&pool)
            .await?;
        assert!(verifier.verify("segredo123", &stored));
        assert_ne!(stored, "segredo123");

        let again = handle(
            pool.clone(),
            verifier,
            &session(UserRole::SuperAdmin),
            command("ana@escola.br", UserRole::Reader),
        )
        .await;
        assert!(matches!(again, Err(CreateUserError::DuplicateEmail(_))));
        Ok(())
    }
}
