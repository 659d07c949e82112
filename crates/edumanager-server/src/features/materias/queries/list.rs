//! List curriculum records query
//!
//! Fetches records matching exact-value filters, ordered by id, overlays the
//! block-derived status and deadline, and sets the `alerta` flag.

use std::collections::{BTreeMap, HashSet};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::config::DEFAULT_ALERT_DAYS;
use crate::features::materias::{
    alerts::{horizon_end, is_alert},
    status::{derive_status, BlockDeadline, BlockSchedule},
    types::{FieldError, FieldValue, Materia, MateriaField, MateriaRow, MATERIA_COLUMNS},
};

/// Query parameters with a reserved meaning; every other key is a column filter
const RESERVED_PARAMS: [&str; 2] = ["alert_days", "prazo_dias"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMateriasQuery {
    /// Column name to exact value
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    /// Horizon for the `alerta` flag
    pub alert_days: Option<u32>,
    /// Only records due within this many days; `0` disables the window
    pub prazo_dias: Option<u32>,
    /// Reference date, defaults to the local date
    #[serde(skip)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMateriasResponse {
    pub items: Vec<Materia>,
    pub total: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ListMateriasError {
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] FieldError),

    #[error("Invalid value '{value}' for parameter '{param}'")]
    InvalidParameter { param: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ListMateriasQuery {
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Split flat HTTP query parameters into reserved settings and filters
    pub fn from_params(mut params: BTreeMap<String, String>) -> Result<Self, ListMateriasError> {
        let mut take = |param: &'static str| -> Result<Option<u32>, ListMateriasError> {
            params
                .remove(param)
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map_err(|_| ListMateriasError::InvalidParameter { param, value: raw })
                })
                .transpose()
        };
        let alert_days = take(RESERVED_PARAMS[0])?;
        let prazo_dias = take(RESERVED_PARAMS[1])?;

        Ok(Self {
            filters: params,
            alert_days,
            prazo_dias,
            today: None,
        })
    }

    /// Map filter keys through the allow-list and type their values
    pub fn parsed_filters(&self) -> Result<Vec<(MateriaField, FieldValue)>, ListMateriasError> {
        self.filters
            .iter()
            .map(|(key, raw)| {
                let field: MateriaField = key.parse()?;
                Ok((field, field.parse_value(raw)?))
            })
            .collect()
    }
}

/// Records due within `days` of `today`, overdue ones included
pub fn within_deadline_window(record: &Materia, days: u32, today: NaiveDate) -> bool {
    record
        .data_limite_da_entrega
        .is_some_and(|deadline| deadline <= horizon_end(today, days))
}

/// Fetch records and overlay their effective status and deadline
pub(crate) async fn fetch_derived(
    pool: &PgPool,
    filters: Vec<(MateriaField, FieldValue)>,
    today: NaiveDate,
) -> sqlx::Result<Vec<Materia>> {
    // Status and deadline are matched against the effective values
    let (derived, stored): (Vec<_>, Vec<_>) =
        filters.into_iter().partition(|(field, _)| field.is_derived());

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
    builder.push(MATERIA_COLUMNS);
    builder.push(
        ", r.grupo FROM controle_materia m \
         LEFT JOIN bloco_grupo_relation r ON r.materia_id = m.id",
    );
    for (i, (field, value)) in stored.into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE m." } else { " AND m." });
        builder.push(field.column());
        builder.push(" = ");
        value.push_bind(&mut builder);
    }
    builder.push(" ORDER BY m.id");

    let rows: Vec<MateriaRow> = builder.build_query_as().fetch_all(pool).await?;
    let records: Vec<(Materia, Option<String>)> =
        rows.into_iter().map(MateriaRow::into_parts).collect();

    let groups: Vec<String> = records
        .iter()
        .filter_map(|(_, grupo)| grupo.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let schedule = if groups.is_empty() {
        BlockSchedule::default()
    } else {
        let blocks: Vec<BlockDeadline> = sqlx::query_as(
            "SELECT bloco, grupo, data_limite_entrega FROM bloco WHERE grupo = ANY($1)",
        )
        .bind(&groups)
        .fetch_all(pool)
        .await?;
        BlockSchedule::new(blocks)
    };

    Ok(records
        .into_iter()
        .map(|(mut record, grupo)| {
            derive_status(&mut record, grupo.as_deref(), &schedule, today);
            record
        })
        .filter(|record| {
            derived
                .iter()
                .all(|(field, value)| field.value_of(record) == *value)
        })
        .collect())
}

#[tracing::instrument(skip(pool, query), fields(filters = query.filters.len()))]
pub async fn handle(
    pool: PgPool,
    query: ListMateriasQuery,
) -> Result<ListMateriasResponse, ListMateriasError> {
    let filters = query.parsed_filters()?;
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());

    let mut items = fetch_derived(&pool, filters, today).await?;

    if let Some(days) = query.prazo_dias.filter(|d| *d > 0) {
        items.retain(|record| within_deadline_window(record, days, today));
    }

    let horizon = query.alert_days.unwrap_or(DEFAULT_ALERT_DAYS);
    for record in &mut items {
        record.alerta = is_alert(record, horizon, today);
    }

    tracing::debug!(count = items.len(), "Records listed");

    Ok(ListMateriasResponse {
        total: items.len(),
        items,
    })
}
