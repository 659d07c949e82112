//! Test fixtures for database tests
//!
//! ```rust,ignore
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     TestBloco::new("1", date, "G").insert(&pool).await?;
//!     let record = TestMateria::new("3A")
//!         .with_bloco("1")
//!         .in_group("G")
//!         .insert(&pool)
//!         .await?;
//!     // ... test logic ...
//!     Ok(())
//! }
//! ```

use chrono::NaiveDate;
use edumanager_common::{MateriaStatus, UserRole};
use sqlx::PgPool;

/// Builder for curriculum records
#[derive(Debug, Clone)]
pub struct TestMateria {
    pub id: i64,
    pub turma: String,
    pub materia: Option<String>,
    pub professor_titular: Option<String>,
    pub bloco: Option<String>,
    pub status: Option<MateriaStatus>,
    pub data_limite_da_entrega: Option<NaiveDate>,
    pub data_de_aprovacao_final: Option<NaiveDate>,
    pub grupo: Option<String>,
}

impl TestMateria {
    pub fn new(turma: &str) -> Self {
        Self {
            id: 0,
            turma: turma.to_string(),
            materia: Some("Matemática".to_string()),
            professor_titular: None,
            bloco: None,
            status: None,
            data_limite_da_entrega: None,
            data_de_aprovacao_final: None,
            grupo: None,
        }
    }

    pub fn with_professor(mut self, nome: &str) -> Self {
        self.professor_titular = Some(nome.to_string());
        self
    }

    pub fn with_bloco(mut self, bloco: &str) -> Self {
        self.bloco = Some(bloco.to_string());
        self
    }

    pub fn with_status(mut self, status: MateriaStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn due(mut self, deadline: NaiveDate) -> Self {
        self.data_limite_da_entrega = Some(deadline);
        self
    }

    pub fn approved_on(mut self, date: NaiveDate) -> Self {
        self.data_de_aprovacao_final = Some(date);
        self
    }

    /// Link the record to a block group on insert
    pub fn in_group(mut self, grupo: &str) -> Self {
        self.grupo = Some(grupo.to_string());
        self
    }

    /// Insert the record (and its group link) and fill in the assigned id
    pub async fn insert(mut self, pool: &PgPool) -> sqlx::Result<Self> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO controle_materia
                (turma, materia, professor_titular, bloco, status,
                 data_limite_da_entrega, data_de_aprovacao_final)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&self.turma)
        .bind(&self.materia)
        .bind(&self.professor_titular)
        .bind(&self.bloco)
        .bind(self.status.map(|s| s.label()))
        .bind(self.data_limite_da_entrega)
        .bind(self.data_de_aprovacao_final)
        .fetch_one(pool)
        .await?;
        self.id = id;

        if let Some(ref grupo) = self.grupo {
            sqlx::query("INSERT INTO bloco_grupo_relation (materia_id, grupo) VALUES ($1, $2)")
                .bind(id)
                .bind(grupo)
                .execute(pool)
                .await?;
        }

        Ok(self)
    }
}

/// Builder for block deadlines
#[derive(Debug, Clone)]
pub struct TestBloco {
    pub bloco: String,
    pub data_limite_entrega: NaiveDate,
    pub grupo: String,
    pub sequencia: i32,
}

impl TestBloco {
    pub fn new(bloco: &str, deadline: NaiveDate, grupo: &str) -> Self {
        Self {
            bloco: bloco.to_string(),
            data_limite_entrega: deadline,
            grupo: grupo.to_string(),
            sequencia: 1,
        }
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            "INSERT INTO bloco (bloco, data_limite_entrega, sequencia, grupo)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&self.bloco)
        .bind(self.data_limite_entrega)
        .bind(self.sequencia)
        .bind(&self.grupo)
        .execute(pool)
        .await?;
        Ok(self)
    }
}

/// Builder for accounts stored with plain-text credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl TestUser {
    pub fn new(email: &str, password: &str, role: UserRole) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            role,
        }
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query("INSERT INTO users (email, password, role) VALUES ($1, $2, $3)")
            .bind(&self.email)
            .bind(&self.password)
            .bind(self.role.as_str())
            .execute(pool)
            .await?;
        Ok(self)
    }
}
