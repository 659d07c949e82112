//! Feature modules implementing the EduManager API
//!
//! Each feature is a vertical slice with its own commands, queries and routes.
//!
//! # Features
//!
//! - **materias**: curriculum records, derived status, alerts, import and edits
//! - **professores**: teacher name list
//! - **blocos**: block deadlines shared by a group of records
//! - **users**: accounts, credentials and per-request authentication
//!
//! # Architecture
//!
//! - `commands/` - Write operations, each with `validate()` and `handle()`
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions and error mapping

pub mod blocos;
pub mod materias;
pub mod professores;
pub mod shared;
pub mod users;

use std::sync::Arc;

use axum::{extract::FromRef, Router};
use sqlx::PgPool;

use crate::config::Config;
use users::CredentialVerifier;

/// Settings the list views fall back to when a request leaves them out
#[derive(Debug, Clone, Copy)]
pub struct ViewDefaults {
    pub alert_days: u32,
}

/// Shared state for all feature routes
#[derive(Clone, FromRef)]
pub struct FeatureState {
    pub db: PgPool,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub defaults: ViewDefaults,
}

impl FeatureState {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            credentials: config.app.credential_scheme.verifier(),
            defaults: ViewDefaults {
                alert_days: config.app.alert_days,
            },
        }
    }
}

/// Creates the `/api/v1` router with all feature routes mounted
///
/// - `/auth` - Login
/// - `/users` - Account registration
/// - `/materias` - Curriculum records
/// - `/professores` - Teacher names
/// - `/blocos` - Block deadlines
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/auth", users::auth_routes())
        .nest("/users", users::users_routes())
        .nest("/materias", materias::materias_routes())
        .nest("/professores", professores::professores_routes())
        .nest("/blocos", blocos::blocos_routes())
        .with_state(state)
}
