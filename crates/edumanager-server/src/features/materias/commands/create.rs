//! Create curriculum record command

use chrono::NaiveDate;
use edumanager_common::MateriaStatus;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

/// Command to insert one curriculum record
///
/// The id is assigned by storage; an `id` key in the request body is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMateriaCommand {
    #[serde(default)]
    pub turma: Option<String>,
    #[serde(default)]
    pub materia: Option<String>,
    #[serde(default)]
    pub professor_titular: Option<String>,
    #[serde(default)]
    pub trimestre: Option<String>,
    #[serde(default)]
    pub capitulo: Option<String>,
    #[serde(default)]
    pub bloco: Option<String>,
    #[serde(default)]
    pub status: Option<MateriaStatus>,
    #[serde(default)]
    pub data_limite_da_entrega: Option<NaiveDate>,
    #[serde(default)]
    pub data_da_entrega: Option<NaiveDate>,
    #[serde(default)]
    pub validacao_operacional: Option<String>,
    #[serde(default)]
    pub revisao_pedagogica: Option<String>,
    #[serde(default)]
    pub diagramacao: Option<String>,
    #[serde(default)]
    pub data_de_aprovacao_final: Option<NaiveDate>,
    #[serde(default)]
    pub obs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMateriaResponse {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateMateriaError {
    #[error("Status '{0}' is derived and cannot be stored")]
    UnstorableStatus(MateriaStatus),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateMateriaCommand {
    pub fn validate(&self) -> Result<(), CreateMateriaError> {
        if let Some(status) = self.status {
            if !status.is_storable() {
                return Err(CreateMateriaError::UnstorableStatus(status));
            }
        }
        Ok(())
    }
}

/// Insert through any executor so bulk import can share one transaction
pub(crate) async fn insert<'e, E>(executor: E, command: &CreateMateriaCommand) -> sqlx::Result<i64>
where
    E: PgExecutor<'e>,
{
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO controle_materia (
            turma, materia, professor_titular, trimestre, capitulo, bloco, status,
            data_limite_da_entrega, data_da_entrega, validacao_operacional,
            revisao_pedagogica, diagramacao, data_de_aprovacao_final, obs
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING id
        "#,
    )
    .bind(&command.turma)
    .bind(&command.materia)
    .bind(&command.professor_titular)
    .bind(&command.trimestre)
    .bind(&command.capitulo)
    .bind(&command.bloco)
    .bind(command.status.map(|s| s.label()))
    .bind(command.data_limite_da_entrega)
    .bind(command.data_da_entrega)
    .bind(&command.validacao_operacional)
    .bind(&command.revisao_pedagogica)
    .bind(&command.diagramacao)
    .bind(command.data_de_aprovacao_final)
    .bind(&command.obs)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

#[tracing::instrument(
    skip(pool, command),
    fields(turma = ?command.turma, materia = ?command.materia)
)]
pub async fn handle(
    pool: PgPool,
    command: CreateMateriaCommand,
) -> Result<CreateMateriaResponse, CreateMateriaError> {
    command.validate()?;

    let id = insert(&pool, &command).await?;

    tracing::info!(materia_id = id, "Record inserted");

    Ok(CreateMateriaResponse { id })
}
