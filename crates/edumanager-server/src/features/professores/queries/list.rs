//! Teacher names for selection lists

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProfessoresResponse {
    pub items: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListProfessoresError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool) -> Result<ListProfessoresResponse, ListProfessoresError> {
    let items: Vec<String> = sqlx::query_scalar("SELECT nome FROM professores ORDER BY nome")
        .fetch_all(&pool)
        .await?;

    Ok(ListProfessoresResponse { items })
}
