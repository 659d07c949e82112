//! Delete curriculum record commands

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMateriaCommand {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMateriaResponse {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteMateriaError {
    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(materia_id = command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteMateriaCommand,
) -> Result<DeleteMateriaResponse, DeleteMateriaError> {
    let result = sqlx::query("DELETE FROM controle_materia WHERE id = $1")
        .bind(command.id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DeleteMateriaError::NotFound(command.id));
    }

    tracing::info!(materia_id = command.id, "Record deleted");

    Ok(DeleteMateriaResponse { id: command.id })
}

/// Delete several selected records at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMateriasCommand {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMateriasResponse {
    pub deleted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteMateriasError {
    #[error("No records selected")]
    NothingSelected,

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DeleteMateriasCommand {
    pub fn validate(&self) -> Result<(), DeleteMateriasError> {
        if self.ids.is_empty() {
            return Err(DeleteMateriasError::NothingSelected);
        }
        Ok(())
    }
}

/// All-or-nothing: an unknown id rolls back the deletes already made
#[tracing::instrument(skip(pool, command), fields(count = command.ids.len()))]
pub async fn handle_many(
    pool: PgPool,
    mut command: DeleteMateriasCommand,
) -> Result<DeleteMateriasResponse, DeleteMateriasError> {
    command.validate()?;
    command.ids.sort_unstable();
    command.ids.dedup();

    let mut tx = pool.begin().await?;
    for id in &command.ids {
        let result = sqlx::query("DELETE FROM controle_materia WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DeleteMateriasError::NotFound(*id));
        }
    }
    tx.commit().await?;

    tracing::info!(deleted = command.ids.len(), "Records deleted");

    Ok(DeleteMateriasResponse {
        deleted: command.ids.len(),
    })
}
