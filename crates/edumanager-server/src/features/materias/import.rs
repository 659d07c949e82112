//! Spreadsheet import schema
//!
//! The accepted layout is the `turma`/`materia`/`bloco` sheet. Extra columns
//! are ignored; a missing required column rejects the whole import before
//! any row is written.

use std::collections::{BTreeMap, BTreeSet};

use edumanager_common::MateriaStatus;
use serde_json::Value;
use thiserror::Error;

use super::commands::create::CreateMateriaCommand;
use super::types::parse_date;

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "turma",
    "materia",
    "professor_titular",
    "trimestre",
    "capitulo",
    "bloco",
    "status",
    "data_limite_da_entrega",
];

pub const OPTIONAL_COLUMNS: [&str; 6] = [
    "data_da_entrega",
    "validacao_operacional",
    "revisao_pedagogica",
    "diagramacao",
    "data_de_aprovacao_final",
    "obs",
];

/// Cell texts spreadsheet exports use for "no value"
const NULL_MARKERS: [&str; 2] = ["nan", "NaT"];

/// One sheet row keyed by header
pub type ImportRow = BTreeMap<String, Value>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportValidationError {
    #[error("Missing required columns: {}", .0.iter().cloned().collect::<Vec<_>>().join(", "))]
    MissingColumns(BTreeSet<String>),

    #[error("Row {row}: invalid value '{value}' in column '{column}'")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Check the header set against the required columns
pub fn validate_columns<I, S>(columns: I) -> Result<(), ImportValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let present: BTreeSet<String> = columns
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .collect();

    let missing: BTreeSet<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !present.contains(**c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportValidationError::MissingColumns(missing))
    }
}

/// Cell text, or `None` for blanks and null markers
pub fn normalize_cell(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() || NULL_MARKERS.contains(&text.as_str()) {
        None
    } else {
        Some(text)
    }
}

/// Convert a sheet row (0-based `index`) into an insert command
pub fn row_to_command(
    index: usize,
    row: &ImportRow,
) -> Result<CreateMateriaCommand, ImportValidationError> {
    let text = |column: &str| normalize_cell(row.get(column));
    let date = |column: &'static str| {
        text(column)
            .map(|raw| {
                parse_date(&raw).ok_or(ImportValidationError::InvalidCell {
                    row: index + 1,
                    column,
                    value: raw,
                })
            })
            .transpose()
    };

    let status = text("status")
        .map(|raw| {
            raw.parse::<MateriaStatus>().map_err(|_| ImportValidationError::InvalidCell {
                row: index + 1,
                column: "status",
                value: raw.clone(),
            })
        })
        .transpose()?;

    Ok(CreateMateriaCommand {
        turma: text("turma"),
        materia: text("materia"),
        professor_titular: text("professor_titular"),
        trimestre: text("trimestre"),
        capitulo: text("capitulo"),
        bloco: text("bloco"),
        status,
        data_limite_da_entrega: date("data_limite_da_entrega")?,
        data_da_entrega: date("data_da_entrega")?,
        validacao_operacional: text("validacao_operacional"),
        revisao_pedagogica: text("revisao_pedagogica"),
        diagramacao: text("diagramacao"),
        data_de_aprovacao_final: date("data_de_aprovacao_final")?,
        obs: text("obs"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_all_required_columns_pass() {
        let mut columns: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        columns.push("coluna_extra");
        assert!(validate_columns(columns).is_ok());
    }

    #[test]
    fn test_missing_column_is_named() {
        let columns = REQUIRED_COLUMNS.iter().filter(|c| **c != "capitulo");
        let err = validate_columns(columns).unwrap_err();
        assert_eq!(
            err,
            ImportValidationError::MissingColumns(BTreeSet::from(["capitulo".to_string()]))
        );
        assert_eq!(err.to_string(), "Missing required columns: capitulo");
    }

    #[test]
    fn test_optional_columns_are_not_required() {
        assert!(validate_columns(REQUIRED_COLUMNS).is_ok());
        assert!(OPTIONAL_COLUMNS.iter().all(|c| !REQUIRED_COLUMNS.contains(c)));
    }

    #[test]
    fn test_headers_are_trimmed() {
        let columns = REQUIRED_COLUMNS.iter().map(|c| format!(" {c} "));
        assert!(validate_columns(columns).is_ok());
    }

    #[test]
    fn test_null_markers() {
        assert_eq!(normalize_cell(Some(&json!("nan"))), None);
        assert_eq!(normalize_cell(Some(&json!("NaT"))), None);
        assert_eq!(normalize_cell(Some(&json!("  "))), None);
        assert_eq!(normalize_cell(Some(&Value::Null)), None);
        assert_eq!(normalize_cell(None), None);
        assert_eq!(normalize_cell(Some(&json!(2))), Some("2".into()));
        assert_eq!(normalize_cell(Some(&json!("Nancy"))), Some("Nancy".into()));
    }

    #[test]
    fn test_row_conversion() {
        let row: ImportRow = serde_json::from_value(json!({
            "turma": "3A",
            "materia": "História",
            "professor_titular": "Ana",
            "trimestre": 1,
            "capitulo": "nan",
            "bloco": "2",
            "status": "Em andamento",
            "data_limite_da_entrega": "2026-11-20 00:00:00",
            "data_da_entrega": "NaT",
            "ignored": "x"
        }))
        .unwrap();

        let command = row_to_command(0, &row).unwrap();
        assert_eq!(command.trimestre.as_deref(), Some("1"));
        assert_eq!(command.capitulo, None);
        assert_eq!(command.status, Some(MateriaStatus::InProgress));
        assert_eq!(command.data_limite_da_entrega, NaiveDate::from_ymd_opt(2026, 11, 20));
        assert_eq!(command.data_da_entrega, None);
    }

    #[test]
    fn test_bad_cells_report_row_and_column() {
        let row: ImportRow = serde_json::from_value(json!({
            "status": "Pronto"
        }))
        .unwrap();
        assert!(matches!(
            row_to_command(4, &row),
            Err(ImportValidationError::InvalidCell { row: 5, column: "status", .. })
        ));

        let row: ImportRow = serde_json::from_value(json!({
            "data_limite_da_entrega": "amanhã"
        }))
        .unwrap();
        assert!(matches!(
            row_to_command(0, &row),
            Err(ImportValidationError::InvalidCell { column: "data_limite_da_entrega", .. })
        ));
    }
}
