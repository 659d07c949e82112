//! Register a block deadline
//!
//! The sequence number counts registrations per block label. Without an
//! explicit group, the block gets its own group `"{bloco}-{sequencia}"`.
//! Registering the same (label, deadline) pair twice is reported, not raised.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::blocos::types::Bloco;
use crate::features::shared::validation::{validate_name, NameValidationError};

const MAX_LABEL_LENGTH: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlocoCommand {
    pub bloco: String,
    pub data_limite_entrega: NaiveDate,
    #[serde(default)]
    pub grupo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateBlocoOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlocoResponse {
    pub outcome: CreateBlocoOutcome,
    pub bloco: Option<Bloco>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateBlocoError {
    #[error("Block label: {0}")]
    LabelValidation(NameValidationError),

    #[error("Group: {0}")]
    GroupValidation(NameValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CreateBlocoCommand {
    pub fn validate(&self) -> Result<(), CreateBlocoError> {
        validate_name(&self.bloco, MAX_LABEL_LENGTH).map_err(CreateBlocoError::LabelValidation)?;
        if let Some(grupo) = &self.grupo {
            validate_name(grupo, MAX_LABEL_LENGTH * 2).map_err(CreateBlocoError::GroupValidation)?;
        }
        Ok(())
    }
}

pub fn default_group(bloco: &str, sequencia: i32) -> String {
    format!("{bloco}-{sequencia}")
}

#[tracing::instrument(skip(pool, command), fields(bloco = %command.bloco, deadline = %command.data_limite_entrega))]
pub async fn handle(
    pool: PgPool,
    command: CreateBlocoCommand,
) -> Result<CreateBlocoResponse, CreateBlocoError> {
    command.validate()?;
    let label = command.bloco.trim();

    let mut tx = pool.begin().await?;

    // Serialises sequence allocation per label
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(label)
        .execute(&mut *tx)
        .await?;

    let (sequencia,): (i32,) =
        sqlx::query_as("SELECT COALESCE(MAX(sequencia), 0) + 1 FROM bloco WHERE bloco = $1")
            .bind(label)
            .fetch_one(&mut *tx)
            .await?;

    let grupo = command
        .grupo
        .as_deref()
        .map(str::trim)
        .map(str::to_string)
        .unwrap_or_else(|| default_group(label, sequencia));

    let inserted: Option<Bloco> = sqlx::query_as(
        r#"
        INSERT INTO bloco (bloco, data_limite_entrega, sequencia, grupo)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ON CONSTRAINT uq_bloco_data DO NOTHING
        RETURNING id, bloco, data_limite_entrega, sequencia, grupo
        "#,
    )
    .bind(label)
    .bind(command.data_limite_entrega)
    .bind(sequencia)
    .bind(&grupo)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;

    let outcome = match &inserted {
        Some(bloco) => {
            tracing::info!(bloco_id = bloco.id, sequencia, grupo = %bloco.grupo, "Block registered");
            CreateBlocoOutcome::Created
        },
        None => {
            tracing::warn!("Block already registered for this deadline");
            CreateBlocoOutcome::AlreadyExists
        },
    };

    Ok(CreateBlocoResponse {
        outcome,
        bloco: inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, d).unwrap()
    }

    fn command(bloco: &str, day: u32) -> CreateBlocoCommand {
        CreateBlocoCommand {
            bloco: bloco.into(),
            data_limite_entrega: date(day),
            grupo: None,
        }
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            command(" ", 1).validate(),
            Err(CreateBlocoError::LabelValidation(_))
        ));
        let mut cmd = command("1", 1);
        cmd.grupo = Some(String::new());
        assert!(matches!(cmd.validate(), Err(CreateBlocoError::GroupValidation(_))));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_sequence_and_default_group(pool: PgPool) -> sqlx::Result<()> {
        let first = handle(pool.clone(), command("3", 1)).await.unwrap();
        let second = handle(pool.clone(), command("3", 8)).await.unwrap();
        let other = handle(pool.clone(), command("4", 8)).await.unwrap();

        let first = first.bloco.unwrap();
        let second = second.bloco.unwrap();
        assert_eq!((first.sequencia, first.grupo.as_str()), (1, "3-1"));
        assert_eq!((second.sequencia, second.grupo.as_str()), (2, "3-2"));
        assert_eq!(other.bloco.unwrap().sequencia, 1);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_explicit_group(pool: PgPool) -> sqlx::Result<()> {
        let mut cmd = command("2", 1);
        cmd.grupo = Some(" turma-3A ".into());
        let response = handle(pool.clone(), cmd).await.unwrap();
        assert_eq!(response.bloco.unwrap().grupo, "turma-3A");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_duplicate_is_not_an_error(pool: PgPool) -> sqlx::Result<()> {
        handle(pool.clone(), command("3", 1)).await.unwrap();
        let again = handle(pool.clone(), command("3", 1)).await.unwrap();
        assert_eq!(again.outcome, CreateBlocoOutcome::AlreadyExists);
        assert!(again.bloco.is_none());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bloco")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }
}
