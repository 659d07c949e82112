//! Bulk import of spreadsheet rows
//!
//! Header validation and row conversion both happen before the first insert.
//! All rows are then written in one transaction.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::materias::import::{
    row_to_command, validate_columns, ImportRow, ImportValidationError,
};

use super::create::{insert, CreateMateriaError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportMateriasCommand {
    /// Header row of the sheet
    pub columns: Vec<String>,
    /// Data rows keyed by header
    pub rows: Vec<ImportRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportMateriasResponse {
    pub imported: usize,
    pub ids: Vec<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportMateriasError {
    #[error("{0}")]
    Validation(#[from] ImportValidationError),

    #[error("Row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: CreateMateriaError,
    },

    #[error("The sheet has no data rows")]
    Empty,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool, command), fields(rows = command.rows.len()))]
pub async fn handle(
    pool: PgPool,
    command: ImportMateriasCommand,
) -> Result<ImportMateriasResponse, ImportMateriasError> {
    validate_columns(&command.columns)?;

    if command.rows.is_empty() {
        return Err(ImportMateriasError::Empty);
    }

    let mut records = Vec::with_capacity(command.rows.len());
    for (index, row) in command.rows.iter().enumerate() {
        let record = row_to_command(index, row)?;
        record
            .validate()
            .map_err(|source| ImportMateriasError::InvalidRow {
                row: index + 1,
                source,
            })?;
        records.push(record);
    }

    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(records.len());
    for record in &records {
        ids.push(insert(&mut *tx, record).await?);
    }
    tx.commit().await?;

    tracing::info!(imported = ids.len(), "Spreadsheet imported");

    Ok(ImportMateriasResponse {
        imported: ids.len(),
        ids,
    })
}
