//! EduManager server library
//!
//! HTTP API for tracking the production of curriculum material ("matérias"):
//! each record moves through a workflow whose status is derived from shared
//! block deadlines, and upcoming deadlines raise alerts.
//!
//! # Layout
//!
//! - [`features`]: vertical slices (`materias`, `professores`, `blocos`, `users`)
//!   with commands, queries and routes
//! - [`api`]: router assembly, response envelopes and the server loop
//! - [`db`]: connection pool and schema creation
//! - [`config`]: environment-based configuration
//! - [`middleware`]: CORS and request tracing
//!
//! # Example
//!
//! ```no_run
//! use edumanager_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::ensure_schema(&pool).await?;
//!     api::serve(pool, config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

pub use error::{AppError, AppResult};
