use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A shared deadline for one block of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bloco {
    pub id: i64,
    pub bloco: String,
    pub data_limite_entrega: NaiveDate,
    /// Per-label registration order, starting at 1
    pub sequencia: i32,
    pub grupo: String,
}

pub(crate) const BLOCO_COLUMNS: &str = "id, bloco, data_limite_entrega, sequencia, grupo";
