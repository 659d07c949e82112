//! Registered block deadlines

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::features::blocos::types::{Bloco, BLOCO_COLUMNS};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBlocosQuery {
    pub bloco: Option<String>,
    pub grupo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBlocosResponse {
    pub items: Vec<Bloco>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListBlocosError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListBlocosQuery,
) -> Result<ListBlocosResponse, ListBlocosError> {
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
    builder.push(BLOCO_COLUMNS).push(" FROM bloco WHERE TRUE");
    if let Some(bloco) = query.bloco {
        builder.push(" AND bloco = ").push_bind(bloco);
    }
    if let Some(grupo) = query.grupo {
        builder.push(" AND grupo = ").push_bind(grupo);
    }
    builder.push(" ORDER BY grupo, data_limite_entrega, id");

    let items: Vec<Bloco> = builder.build_query_as().fetch_all(&pool).await?;

    Ok(ListBlocosResponse { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::TestBloco;
    use chrono::NaiveDate;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_and_filter(pool: PgPool) -> sqlx::Result<()> {
        let day = |d| NaiveDate::from_ymd_opt(2026, 11, d).unwrap();
        TestBloco::new("2", day(20), "G").insert(&pool).await?;
        TestBloco::new("1", day(10), "G").insert(&pool).await?;
        TestBloco::new("1", day(12), "H").insert(&pool).await?;

        let all = handle(pool.clone(), ListBlocosQuery::default()).await.unwrap();
        let order: Vec<(&str, &str)> = all
            .items
            .iter()
            .map(|b| (b.grupo.as_str(), b.bloco.as_str()))
            .collect();
        assert_eq!(order, vec![("G", "1"), ("G", "2"), ("H", "1")]);

        let group = handle(
            pool.clone(),
            ListBlocosQuery {
                grupo: Some("G".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(group.items.len(), 2);
        Ok(())
    }
}
