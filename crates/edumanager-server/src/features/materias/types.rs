//! Curriculum record types and the column allow-list
//!
//! Every column name that reaches dynamically built SQL comes from
//! [`MateriaField::column`], never from caller input.

use chrono::NaiveDate;
use edumanager_common::MateriaStatus;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use thiserror::Error;

/// Column list shared by every `SELECT` over `controle_materia` (aliased `m`)
pub(crate) const MATERIA_COLUMNS: &str = "m.id, m.turma, m.materia, m.professor_titular, \
     m.trimestre, m.capitulo, m.bloco, m.status, m.data_limite_da_entrega, m.data_da_entrega, \
     m.validacao_operacional, m.revisao_pedagogica, m.diagramacao, \
     m.data_de_aprovacao_final, m.obs";

/// A curriculum production record as shown to callers
///
/// `status` and `data_limite_da_entrega` hold the effective values after
/// block derivation when the record comes from the list query. `alerta` is
/// computed at read time and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Materia {
    pub id: i64,
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
    #[serde(default)]
    pub alerta: bool,
}

impl Materia {
    /// Empty record with only an id, handy for building snapshots
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            turma: None,
            materia: None,
            professor_titular: None,
            trimestre: None,
            capitulo: None,
            bloco: None,
            status: None,
            data_limite_da_entrega: None,
            data_da_entrega: None,
            validacao_operacional: None,
            revisao_pedagogica: None,
            diagramacao: None,
            data_de_aprovacao_final: None,
            obs: None,
            alerta: false,
        }
    }
}

/// Raw `controle_materia` row plus the optional group link
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct MateriaRow {
    pub id: i64,
    pub turma: Option<String>,
    pub materia: Option<String>,
    pub professor_titular: Option<String>,
    pub trimestre: Option<String>,
    pub capitulo: Option<String>,
    pub bloco: Option<String>,
    pub status: Option<String>,
    pub data_limite_da_entrega: Option<NaiveDate>,
    pub data_da_entrega: Option<NaiveDate>,
    pub validacao_operacional: Option<String>,
    pub revisao_pedagogica: Option<String>,
    pub diagramacao: Option<String>,
    pub data_de_aprovacao_final: Option<NaiveDate>,
    pub obs: Option<String>,
    pub grupo: Option<String>,
}

impl MateriaRow {
    /// Split into the public record and its group link
    ///
    /// A stored status outside the known labels is surfaced as `None`.
    pub fn into_parts(self) -> (Materia, Option<String>) {
        let status = self.status.as_deref().and_then(|raw| match raw.parse() {
            Ok(status) => Some(status),
            Err(_) => {
                tracing::warn!(materia_id = self.id, status = raw, "Unknown stored status");
                None
            },
        });

        let materia = Materia {
            id: self.id,
            turma: self.turma,
            materia: self.materia,
            professor_titular: self.professor_titular,
            trimestre: self.trimestre,
            capitulo: self.capitulo,
            bloco: self.bloco,
            status,
            data_limite_da_entrega: self.data_limite_da_entrega,
            data_da_entrega: self.data_da_entrega,
            validacao_operacional: self.validacao_operacional,
            revisao_pedagogica: self.revisao_pedagogica,
            diagramacao: self.diagramacao,
            data_de_aprovacao_final: self.data_de_aprovacao_final,
            obs: self.obs,
            alerta: false,
        };
        (materia, self.grupo)
    }
}

// ============================================================================
// Field allow-list
// ============================================================================

/// Every column of `controle_materia` a caller may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MateriaField {
    Id,
    Turma,
    Materia,
    ProfessorTitular,
    Trimestre,
    Capitulo,
    Bloco,
    Status,
    DataLimiteDaEntrega,
    DataDaEntrega,
    ValidacaoOperacional,
    RevisaoPedagogica,
    Diagramacao,
    DataDeAprovacaoFinal,
    Obs,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },
}

impl MateriaField {
    /// Fields the reconciler compares, in column order
    pub const EDITABLE: [MateriaField; 14] = [
        MateriaField::Turma,
        MateriaField::Materia,
        MateriaField::ProfessorTitular,
        MateriaField::Trimestre,
        MateriaField::Capitulo,
        MateriaField::Bloco,
        MateriaField::Status,
        MateriaField::DataLimiteDaEntrega,
        MateriaField::DataDaEntrega,
        MateriaField::ValidacaoOperacional,
        MateriaField::RevisaoPedagogica,
        MateriaField::Diagramacao,
        MateriaField::DataDeAprovacaoFinal,
        MateriaField::Obs,
    ];

    pub fn column(self) -> &'static str {
        match self {
            MateriaField::Id => "id",
            MateriaField::Turma => "turma",
            MateriaField::Materia => "materia",
            MateriaField::ProfessorTitular => "professor_titular",
            MateriaField::Trimestre => "trimestre",
            MateriaField::Capitulo => "capitulo",
            MateriaField::Bloco => "bloco",
            MateriaField::Status => "status",
            MateriaField::DataLimiteDaEntrega => "data_limite_da_entrega",
            MateriaField::DataDaEntrega => "data_da_entrega",
            MateriaField::ValidacaoOperacional => "validacao_operacional",
            MateriaField::RevisaoPedagogica => "revisao_pedagogica",
            MateriaField::Diagramacao => "diagramacao",
            MateriaField::DataDeAprovacaoFinal => "data_de_aprovacao_final",
            MateriaField::Obs => "obs",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            MateriaField::DataLimiteDaEntrega
                | MateriaField::DataDaEntrega
                | MateriaField::DataDeAprovacaoFinal
        )
    }

    /// Fields overwritten by the block chain and the review gate
    pub fn is_derived(self) -> bool {
        matches!(self, MateriaField::Status | MateriaField::DataLimiteDaEntrega)
    }

    /// Current value of this field on `record`
    pub fn value_of(self, record: &Materia) -> FieldValue {
        match self {
            MateriaField::Id => FieldValue::Id(record.id),
            MateriaField::Turma => FieldValue::Text(record.turma.clone()),
            MateriaField::Materia => FieldValue::Text(record.materia.clone()),
            MateriaField::ProfessorTitular => FieldValue::Text(record.professor_titular.clone()),
            MateriaField::Trimestre => FieldValue::Text(record.trimestre.clone()),
            MateriaField::Capitulo => FieldValue::Text(record.capitulo.clone()),
            MateriaField::Bloco => FieldValue::Text(record.bloco.clone()),
            MateriaField::Status => FieldValue::Status(record.status),
            MateriaField::DataLimiteDaEntrega => FieldValue::Date(record.data_limite_da_entrega),
            MateriaField::DataDaEntrega => FieldValue::Date(record.data_da_entrega),
            MateriaField::ValidacaoOperacional => {
                FieldValue::Text(record.validacao_operacional.clone())
            },
            MateriaField::RevisaoPedagogica => FieldValue::Text(record.revisao_pedagogica.clone()),
            MateriaField::Diagramacao => FieldValue::Text(record.diagramacao.clone()),
            MateriaField::DataDeAprovacaoFinal => {
                FieldValue::Date(record.data_de_aprovacao_final)
            },
            MateriaField::Obs => FieldValue::Text(record.obs.clone()),
        }
    }

    /// Parse a textual filter value into the column's type
    pub fn parse_value(self, raw: &str) -> Result<FieldValue, FieldError> {
        let invalid = || FieldError::InvalidValue {
            field: self.column(),
            value: raw.to_string(),
        };

        match self {
            MateriaField::Id => raw.trim().parse().map(FieldValue::Id).map_err(|_| invalid()),
            MateriaField::Status => raw
                .parse::<MateriaStatus>()
                .map(|s| FieldValue::Status(Some(s)))
                .map_err(|_| invalid()),
            field if field.is_date() => parse_date(raw)
                .map(|d| FieldValue::Date(Some(d)))
                .ok_or_else(invalid),
            _ => Ok(FieldValue::Text(Some(raw.to_string()))),
        }
    }
}

impl std::str::FromStr for MateriaField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        std::iter::once(MateriaField::Id)
            .chain(MateriaField::EDITABLE)
            .find(|field| field.column() == name)
            .ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

impl std::fmt::Display for MateriaField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A typed column value ready to be bound as a statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Id(i64),
    Text(Option<String>),
    Status(Option<MateriaStatus>),
    Date(Option<NaiveDate>),
}

impl FieldValue {
    /// Append this value as a bind parameter
    pub(crate) fn push_bind(self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            FieldValue::Id(id) => {
                builder.push_bind(id);
            },
            FieldValue::Text(text) => {
                builder.push_bind(text);
            },
            FieldValue::Status(status) => {
                builder.push_bind(status.map(|s| s.label().to_string()));
            },
            FieldValue::Date(date) => {
                builder.push_bind(date);
            },
        }
    }
}

/// Accepts ISO dates, ISO timestamps and the `dd/mm/yyyy` form used in spreadsheets
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date());
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}
