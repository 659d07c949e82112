//! Upcoming deadline alerts query

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::materias::{alerts::compute_alerts, types::Materia};

use super::list::{fetch_derived, ListMateriasError, ListMateriasQuery};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMateriaAlertsQuery {
    /// Lookahead in days; the configured default applies when absent
    pub days: Option<u32>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    #[serde(skip)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMateriaAlertsResponse {
    pub horizon_days: u32,
    pub items: Vec<Materia>,
    pub total: usize,
}

impl ListMateriaAlertsQuery {
    pub fn within(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Split flat HTTP query parameters: `days` is reserved, the rest filter columns
    pub fn from_params(mut params: BTreeMap<String, String>) -> Result<Self, ListMateriasError> {
        let days = params
            .remove("days")
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| ListMateriasError::InvalidParameter { param: "days", value: raw })
            })
            .transpose()?;

        Ok(Self {
            days,
            filters: params,
            today: None,
        })
    }
}

#[tracing::instrument(skip(pool, query), fields(days = ?query.days))]
pub async fn handle(
    pool: PgPool,
    query: ListMateriaAlertsQuery,
    default_days: u32,
) -> Result<ListMateriaAlertsResponse, ListMateriasError> {
    let filters = ListMateriasQuery {
        filters: query.filters,
        ..ListMateriasQuery::default()
    }
    .parsed_filters()?;
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let horizon_days = query.days.unwrap_or(default_days);

    let records = fetch_derived(&pool, filters, today).await?;
    let items = compute_alerts(&records, horizon_days, today);

    Ok(ListMateriaAlertsResponse {
        horizon_days,
        total: items.len(),
        items,
    })
}
