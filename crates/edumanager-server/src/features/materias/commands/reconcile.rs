//! Reconcile an edited snapshot against its original
//!
//! All row updates of one call run in a single transaction. Any failure
//! rolls back every statement of the call, so either all changed rows are
//! written or none are.

use edumanager_common::MateriaStatus;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::materias::{
    diff::{plan_updates, DiffError, RowChangeSummary},
    types::{FieldValue, Materia},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileMateriasCommand {
    /// Records as they were fetched
    pub original: Vec<Materia>,
    /// The same records after editing
    pub edited: Vec<Materia>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileMateriasResponse {
    pub updated_count: usize,
    pub updated: Vec<RowChangeSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileMateriasError {
    #[error("Edited row {0} is not in the original snapshot; reload and try again")]
    RowNotFound(i64),

    #[error("Row {0} appears more than once")]
    DuplicateRow(i64),

    #[error("Row {id}: status '{status}' is derived and cannot be stored")]
    UnstorableStatus { id: i64, status: MateriaStatus },

    #[error("Record {0} no longer exists")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<DiffError> for ReconcileMateriasError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::RowNotFound(id) => Self::RowNotFound(id),
            DiffError::DuplicateRow(id) => Self::DuplicateRow(id),
        }
    }
}

#[tracing::instrument(
    skip(pool, command),
    fields(original = command.original.len(), edited = command.edited.len())
)]
pub async fn handle(
    pool: PgPool,
    command: ReconcileMateriasCommand,
) -> Result<ReconcileMateriasResponse, ReconcileMateriasError> {
    let updates = plan_updates(&command.original, &command.edited)?;

    for update in &updates {
        for (_, value) in &update.changes {
            if let FieldValue::Status(Some(status)) = value {
                if !status.is_storable() {
                    return Err(ReconcileMateriasError::UnstorableStatus {
                        id: update.id,
                        status: *status,
                    });
                }
            }
        }
    }

    if updates.is_empty() {
        tracing::debug!("No changes to apply");
        return Ok(ReconcileMateriasResponse {
            updated_count: 0,
            updated: Vec::new(),
        });
    }

    let mut tx = pool.begin().await?;

    for update in &updates {
        let result = update.to_statement().build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::warn!(materia_id = update.id, "Row vanished during reconcile, rolled back");
            return Err(ReconcileMateriasError::NotFound(update.id));
        }
    }

    tx.commit().await?;

    let updated: Vec<RowChangeSummary> = updates.iter().map(|u| u.summary()).collect();
    for row in &updated {
        tracing::info!(materia_id = row.id, fields = ?row.fields, "Record updated");
    }

    Ok(ReconcileMateriasResponse {
        updated_count: updated.len(),
        updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::materias::queries::list::{self, ListMateriasQuery};
    use crate::features::shared::test_helpers::TestMateria;
    use chrono::NaiveDate;

    async fn snapshot(pool: &PgPool) -> Vec<Materia> {
        list::handle(pool.clone(), ListMateriasQuery::default())
            .await
            .unwrap()
            .items
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_updates_exactly_the_changed_field(pool: PgPool) -> sqlx::Result<()> {
        TestMateria::new("3A").insert(&pool).await?;
        let target = TestMateria::new("3B").insert(&pool).await?;
        TestMateria::new("3C").insert(&pool).await?;

        let original = snapshot(&pool).await;
        let mut edited = original.clone();
        let row = edited.iter_mut().find(|m| m.id == target.id).unwrap();
        row.professor_titular = Some("Carla Dias".into());

        let response = handle(
            pool.clone(),
            ReconcileMateriasCommand {
                original: original.clone(),
                edited: edited.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.updated_count, 1);
        assert_eq!(response.updated[0].id, target.id);

        assert_eq!(snapshot(&pool).await, edited);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_second_pass_is_a_no_op(pool: PgPool) -> sqlx::Result<()> {
        TestMateria::new("3A").insert(&pool).await?;
        let original = snapshot(&pool).await;
        let mut edited = original.clone();
        edited[0].data_da_entrega = NaiveDate::from_ymd_opt(2026, 10, 1);

        let first = handle(
            pool.clone(),
            ReconcileMateriasCommand {
                original,
                edited: edited.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(first.updated_count, 1);

        let second = handle(
            pool.clone(),
            ReconcileMateriasCommand {
                original: snapshot(&pool).await,
                edited,
            },
        )
        .await
        .unwrap();
        assert_eq!(second.updated_count, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_failure_rolls_back_every_row(pool: PgPool) -> sqlx::Result<()> {
        let kept = TestMateria::new("3A").insert(&pool).await?;
        let doomed = TestMateria::new("3B").insert(&pool).await?;

        let original = snapshot(&pool).await;
        let mut edited = original.clone();
        for row in &mut edited {
            row.obs = Some(format!("edit {}", row.id));
        }

        sqlx::query("DELETE FROM controle_materia WHERE id = $1")
            .bind(doomed.id)
            .execute(&pool)
            .await?;
        let before = snapshot(&pool).await;

        let result = handle(pool.clone(), ReconcileMateriasCommand { original, edited }).await;
        assert!(matches!(result, Err(ReconcileMateriasError::NotFound(id)) if id == doomed.id));

        let after = snapshot(&pool).await;
        assert_eq!(before, after);
        assert_eq!(after[0].id, kept.id);
        assert_eq!(after[0].obs, None);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_stale_snapshot_writes_nothing(pool: PgPool) -> sqlx::Result<()> {
        TestMateria::new("3A").insert(&pool).await?;
        let original = snapshot(&pool).await;
        let mut edited = original.clone();
        edited[0].obs = Some("x".into());
        let mut stranger = Materia::with_id(9_999);
        stranger.obs = Some("y".into());
        edited.push(stranger);

        let result = handle(pool.clone(), ReconcileMateriasCommand { original, edited }).await;
        assert!(matches!(result, Err(ReconcileMateriasError::RowNotFound(9_999))));
        assert_eq!(snapshot(&pool).await[0].obs, None);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_derived_status_cannot_be_stored(pool: PgPool) -> sqlx::Result<()> {
        TestMateria::new("3A").insert(&pool).await?;
        let original = snapshot(&pool).await;
        let mut edited = original.clone();
        edited[0].status = Some(MateriaStatus::AwaitingPedagogicalReview);

        let result = handle(pool.clone(), ReconcileMateriasCommand { original, edited }).await;
        assert!(matches!(
            result,
            Err(ReconcileMateriasError::UnstorableStatus { .. })
        ));
        Ok(())
    }
}
