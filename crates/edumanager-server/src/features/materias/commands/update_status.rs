//! Set the stored status of one record

use edumanager_common::MateriaStatus;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusCommand {
    #[serde(default)]
    pub id: i64,
    pub status: MateriaStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub id: i64,
    pub status: MateriaStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateStatusError {
    #[error("Status '{0}' is derived and cannot be stored")]
    UnstorableStatus(MateriaStatus),

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UpdateStatusCommand {
    pub fn validate(&self) -> Result<(), UpdateStatusError> {
        if !self.status.is_storable() {
            return Err(UpdateStatusError::UnstorableStatus(self.status));
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool), fields(materia_id = command.id, status = %command.status))]
pub async fn handle(
    pool: PgPool,
    command: UpdateStatusCommand,
) -> Result<UpdateStatusResponse, UpdateStatusError> {
    command.validate()?;

    let result = sqlx::query("UPDATE controle_materia SET status = $1 WHERE id = $2")
        .bind(command.status.label())
        .bind(command.id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UpdateStatusError::NotFound(command.id));
    }

    tracing::info!("Status updated");

    Ok(UpdateStatusResponse {
        id: command.id,
        status: command.status,
    })
}
