//! Register a teacher name

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::validation::{validate_name, NameValidationError};

const MAX_NAME_LENGTH: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessorCommand {
    pub nome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessorResponse {
    pub nome: String,
    /// `false` when the name was already registered
    pub created: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProfessorError {
    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateProfessorCommand {
    pub fn validate(&self) -> Result<(), CreateProfessorError> {
        validate_name(&self.nome, MAX_NAME_LENGTH)?;
        Ok(())
    }
}

/// Insert-or-ignore: an existing name is not an error
#[tracing::instrument(skip(pool, command), fields(nome = %command.nome))]
pub async fn handle(
    pool: PgPool,
    command: CreateProfessorCommand,
) -> Result<CreateProfessorResponse, CreateProfessorError> {
    command.validate()?;
    let nome = command.nome.trim().to_string();

    let inserted: Option<(i64,)> = sqlx::query_as(
        "INSERT INTO professores (nome) VALUES ($1) ON CONFLICT (nome) DO NOTHING RETURNING id",
    )
    .bind(&nome)
    .fetch_optional(&pool)
    .await?;

    let created = inserted.is_some();
    if created {
        tracing::info!("Teacher registered");
    } else {
        tracing::debug!("Teacher already registered");
    }

    Ok(CreateProfessorResponse { nome, created })
}
