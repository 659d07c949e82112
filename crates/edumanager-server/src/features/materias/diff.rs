//! Field-level diff between two snapshots of the same records
//!
//! Only [`MateriaField::EDITABLE`] columns are compared, so `id` and the
//! read-only `alerta` flag never produce an update.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use thiserror::Error;

use super::types::{FieldValue, Materia, MateriaField};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Edited row {0} is not part of the original snapshot")]
    RowNotFound(i64),

    #[error("Row {0} appears more than once in the snapshot")]
    DuplicateRow(i64),
}

/// Changed columns of one row with their new values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    pub id: i64,
    pub changes: Vec<(MateriaField, FieldValue)>,
}

/// What the caller gets back about one updated row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowChangeSummary {
    pub id: i64,
    pub fields: Vec<MateriaField>,
}

impl RowUpdate {
    pub fn summary(&self) -> RowChangeSummary {
        RowChangeSummary {
            id: self.id,
            fields: self.changes.iter().map(|(field, _)| *field).collect(),
        }
    }

    /// `UPDATE controle_materia SET <col> = $n, ... WHERE id = $m`
    pub(crate) fn to_statement(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("UPDATE controle_materia SET ");
        for (i, (field, value)) in self.changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(field.column());
            builder.push(" = ");
            value.clone().push_bind(&mut builder);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(self.id);
        builder
    }
}

/// Columns whose edited value differs from the original
pub fn diff_row(original: &Materia, edited: &Materia) -> Vec<(MateriaField, FieldValue)> {
    MateriaField::EDITABLE
        .into_iter()
        .filter_map(|field| {
            let after = field.value_of(edited);
            (field.value_of(original) != after).then_some((field, after))
        })
        .collect()
}

/// One update per edited row that actually changed
///
/// Fails before anything is written if an edited row has no original
/// counterpart, which means the snapshot is stale.
pub fn plan_updates(original: &[Materia], edited: &[Materia]) -> Result<Vec<RowUpdate>, DiffError> {
    let mut by_id: HashMap<i64, &Materia> = HashMap::with_capacity(original.len());
    for record in original {
        if by_id.insert(record.id, record).is_some() {
            return Err(DiffError::DuplicateRow(record.id));
        }
    }

    let mut seen = HashSet::with_capacity(edited.len());
    let mut updates = Vec::new();
    for row in edited {
        if !seen.insert(row.id) {
            return Err(DiffError::DuplicateRow(row.id));
        }
        let before = by_id.get(&row.id).ok_or(DiffError::RowNotFound(row.id))?;
        let changes = diff_row(before, row);
        if !changes.is_empty() {
            updates.push(RowUpdate { id: row.id, changes });
        }
    }
    Ok(updates)
}
