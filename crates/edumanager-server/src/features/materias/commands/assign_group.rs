//! Link a record to a block group

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::{
    error_helpers::map_foreign_key_violation,
    validation::{validate_name, NameValidationError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignGroupCommand {
    #[serde(default)]
    pub materia_id: i64,
    pub grupo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignGroupResponse {
    pub materia_id: i64,
    pub grupo: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssignGroupError {
    #[error("Group validation failed: {0}")]
    GroupValidation(#[from] NameValidationError),

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AssignGroupCommand {
    pub fn validate(&self) -> Result<(), AssignGroupError> {
        validate_name(&self.grupo, 128)?;
        Ok(())
    }
}

/// Replaces any previous link of the record
#[tracing::instrument(skip(pool, command), fields(materia_id = command.materia_id, grupo = %command.grupo))]
pub async fn handle(
    pool: PgPool,
    command: AssignGroupCommand,
) -> Result<AssignGroupResponse, AssignGroupError> {
    command.validate()?;
    let grupo = command.grupo.trim().to_string();

    sqlx::query(
        r#"
        INSERT INTO bloco_grupo_relation (materia_id, grupo)
        VALUES ($1, $2)
        ON CONFLICT (materia_id) DO UPDATE SET grupo = EXCLUDED.grupo
        "#,
    )
    .bind(command.materia_id)
    .bind(&grupo)
    .execute(&pool)
    .await
    .map_err(|e| {
        map_foreign_key_violation(
            e,
            AssignGroupError::NotFound(command.materia_id),
            AssignGroupError::Database,
        )
    })?;

    tracing::info!("Record linked to group");

    Ok(AssignGroupResponse {
        materia_id: command.materia_id,
        grupo,
    })
}
