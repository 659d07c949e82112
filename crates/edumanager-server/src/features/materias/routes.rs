//! Curriculum record API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/materias?turma=3A&prazo_dias=7` - List records with derived status
//! - `GET /api/v1/materias/alerts?days=7` - Records due within the horizon
//! - `POST /api/v1/materias` - Insert one record
//! - `POST /api/v1/materias/import` - Bulk insert spreadsheet rows
//! - `POST /api/v1/materias/reconcile` - Persist edits from a table snapshot
//! - `POST /api/v1/materias/delete` - Delete selected records
//! - `DELETE /api/v1/materias/:id` - Delete one record
//! - `PUT /api/v1/materias/:id/grupo` - Link a record to a block group
//! - `PUT /api/v1/materias/:id/status` - Set the stored status
//!
//! Reads need any authenticated account; writes need a privileged role.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::{
    commands::{
        AssignGroupCommand, AssignGroupError, CreateMateriaCommand, CreateMateriaError,
        DeleteMateriaCommand, DeleteMateriaError, DeleteMateriasCommand, DeleteMateriasError,
        ImportMateriasCommand, ImportMateriasError, ReconcileMateriasCommand,
        ReconcileMateriasError, UpdateStatusCommand, UpdateStatusError,
    },
    import::ImportValidationError,
    queries::{ListMateriaAlertsQuery, ListMateriasError, ListMateriasQuery},
};
use crate::api::response::{error_response, internal_error, ApiResponse, ErrorResponse};
use crate::features::users::{AuthError, SessionContext};
use crate::features::{FeatureState, ViewDefaults};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn materias_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_materias).post(create_materia))
        .route("/alerts", get(list_alerts))
        .route("/import", post(import_materias))
        .route("/reconcile", post(reconcile_materias))
        .route("/delete", post(delete_materias))
        .route("/:id", delete(delete_materia))
        .route("/:id/grupo", put(assign_group))
        .route("/:id/status", put(update_status))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Insert one record
///
/// # Response
///
/// - `201 Created` - `{id}`
/// - `400 Bad Request` - Derived status submitted
/// - `403 Forbidden` - Read-only account
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn create_materia(
    State(pool): State<PgPool>,
    session: SessionContext,
    Json(command): Json<CreateMateriaCommand>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;

    let response = super::commands::create::handle(pool, command).await?;

    tracing::info!(materia_id = response.id, "Record created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Bulk insert spreadsheet rows
///
/// # Request Body
///
/// ```json
/// {
///   "columns": ["turma", "materia", "professor_titular", "trimestre",
///               "capitulo", "bloco", "status", "data_limite_da_entrega"],
///   "rows": [{"turma": "3A", "materia": "História", "bloco": "nan", ...}]
/// }
/// ```
///
/// # Response
///
/// - `201 Created` - `{imported, ids}`
/// - `400 Bad Request` - Missing columns or an invalid row; nothing is written
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email, rows = command.rows.len()))]
async fn import_materias(
    State(pool): State<PgPool>,
    session: SessionContext,
    Json(command): Json<ImportMateriasCommand>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;

    let response = super::commands::import::handle(pool, command).await?;

    tracing::info!(imported = response.imported, "Spreadsheet imported via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Persist the differences between two table snapshots
///
/// # Response
///
/// - `200 OK` - `{updated_count, updated}`
/// - `409 Conflict` - The edited snapshot no longer matches the original
/// - `404 Not Found` - A record was deleted meanwhile; nothing is written
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn reconcile_materias(
    State(pool): State<PgPool>,
    session: SessionContext,
    Json(command): Json<ReconcileMateriasCommand>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;

    let response = super::commands::reconcile::handle(pool, command).await?;

    tracing::info!(updated = response.updated_count, "Edits reconciled via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Delete the selected records, all or none
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn delete_materias(
    State(pool): State<PgPool>,
    session: SessionContext,
    Json(command): Json<DeleteMateriasCommand>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;

    let response = super::commands::delete::handle_many(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, session), fields(by = %session.email))]
async fn delete_materia(
    State(pool): State<PgPool>,
    session: SessionContext,
    Path(id): Path<i64>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;

    let response = super::commands::delete::handle(pool, DeleteMateriaCommand { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Link a record to a block group
///
/// # Request Body
///
/// ```json
/// { "grupo": "1-1" }
/// ```
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn assign_group(
    State(pool): State<PgPool>,
    session: SessionContext,
    Path(id): Path<i64>,
    Json(mut command): Json<AssignGroupCommand>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;
    command.materia_id = id;

    let response = super::commands::assign_group::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Set the stored status of one record
///
/// # Request Body
///
/// ```json
/// { "status": "Em andamento" }
/// ```
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn update_status(
    State(pool): State<PgPool>,
    session: SessionContext,
    Path(id): Path<i64>,
    Json(mut command): Json<UpdateStatusCommand>,
) -> Result<Response, MateriaApiError> {
    session.require_privileged()?;
    command.id = id;

    let response = super::commands::update_status::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List records with their effective status
///
/// Every query parameter except `alert_days` and `prazo_dias` is an exact
/// match on the column of the same name.
#[tracing::instrument(skip(pool, defaults, session, params), fields(by = %session.email))]
async fn list_materias(
    State(pool): State<PgPool>,
    State(defaults): State<ViewDefaults>,
    session: SessionContext,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, MateriaApiError> {
    let mut query = ListMateriasQuery::from_params(params)?;
    query.alert_days.get_or_insert(defaults.alert_days);

    let response = super::queries::list::handle(pool, query).await?;

    tracing::debug!(count = response.total, "Records listed via API");

    let meta = json!({ "total": response.total });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta))).into_response())
}

#[tracing::instrument(skip(pool, defaults, session, params), fields(by = %session.email))]
async fn list_alerts(
    State(pool): State<PgPool>,
    State(defaults): State<ViewDefaults>,
    session: SessionContext,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, MateriaApiError> {
    let query = ListMateriaAlertsQuery::from_params(params)?;

    let response = super::queries::alerts::handle(pool, query, defaults.alert_days).await?;

    let meta = json!({ "total": response.total, "horizon_days": response.horizon_days });
    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for record endpoints
#[derive(Debug)]
enum MateriaApiError {
    Auth(AuthError),
    List(ListMateriasError),
    Create(CreateMateriaError),
    Import(ImportMateriasError),
    Reconcile(ReconcileMateriasError),
    Delete(DeleteMateriaError),
    DeleteMany(DeleteMateriasError),
    AssignGroup(AssignGroupError),
    UpdateStatus(UpdateStatusError),
}

macro_rules! impl_from {
    ($($variant:ident($err:ty)),* $(,)?) => {
        $(
            impl From<$err> for MateriaApiError {
                fn from(err: $err) -> Self {
                    Self::$variant(err)
                }
            }
        )*
    };
}

impl_from!(
    Auth(AuthError),
    List(ListMateriasError),
    Create(CreateMateriaError),
    Import(ImportMateriasError),
    Reconcile(ReconcileMateriasError),
    Delete(DeleteMateriaError),
    DeleteMany(DeleteMateriasError),
    AssignGroup(AssignGroupError),
    UpdateStatus(UpdateStatusError),
);

impl IntoResponse for MateriaApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            MateriaApiError::Auth(err) => err.into_response(),

            // List errors
            MateriaApiError::List(
                ListMateriasError::InvalidQuery(_) | ListMateriasError::InvalidParameter { .. },
            ) => error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
            MateriaApiError::List(ListMateriasError::Database(ref err)) => {
                internal_error("record listing", err)
            },

            // Create errors
            MateriaApiError::Create(CreateMateriaError::UnstorableStatus(_)) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            },
            MateriaApiError::Create(CreateMateriaError::Database(ref err)) => {
                internal_error("record creation", err)
            },

            // Import errors
            MateriaApiError::Import(ImportMateriasError::Validation(
                ImportValidationError::MissingColumns(ref missing),
            )) => ErrorResponse::with_details(
                "VALIDATION_ERROR",
                message,
                json!({ "missing_columns": missing }),
            )
            .into_response_with(StatusCode::BAD_REQUEST),
            MateriaApiError::Import(
                ImportMateriasError::Validation(ImportValidationError::InvalidCell { .. })
                | ImportMateriasError::InvalidRow { .. }
                | ImportMateriasError::Empty,
            ) => error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
            MateriaApiError::Import(ImportMateriasError::Database(ref err)) => {
                internal_error("spreadsheet import", err)
            },

            // Reconcile errors
            MateriaApiError::Reconcile(ReconcileMateriasError::RowNotFound(_)) => {
                error_response(StatusCode::CONFLICT, "CONFLICT", message)
            },
            MateriaApiError::Reconcile(
                ReconcileMateriasError::DuplicateRow(_)
                | ReconcileMateriasError::UnstorableStatus { .. },
            ) => error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
            MateriaApiError::Reconcile(ReconcileMateriasError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            },
            MateriaApiError::Reconcile(ReconcileMateriasError::Database(ref err)) => {
                internal_error("reconcile", err)
            },

            // Delete errors
            MateriaApiError::Delete(DeleteMateriaError::NotFound(_))
            | MateriaApiError::DeleteMany(DeleteMateriasError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            },
            MateriaApiError::DeleteMany(DeleteMateriasError::NothingSelected) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            },
            MateriaApiError::Delete(DeleteMateriaError::Database(ref err))
            | MateriaApiError::DeleteMany(DeleteMateriasError::Database(ref err)) => {
                internal_error("record deletion", err)
            },

            // Group link errors
            MateriaApiError::AssignGroup(AssignGroupError::GroupValidation(_)) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            },
            MateriaApiError::AssignGroup(AssignGroupError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            },
            MateriaApiError::AssignGroup(AssignGroupError::Database(ref err)) => {
                internal_error("group link", err)
            },

            // Status errors
            MateriaApiError::UpdateStatus(UpdateStatusError::UnstorableStatus(_)) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            },
            MateriaApiError::UpdateStatus(UpdateStatusError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            },
            MateriaApiError::UpdateStatus(UpdateStatusError::Database(ref err)) => {
                internal_error("status update", err)
            },
        }
    }
}

impl std::fmt::Display for MateriaApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "{}", e),
            Self::List(e) => write!(f, "{}", e),
            Self::Create(e) => write!(f, "{}", e),
            Self::Import(e) => write!(f, "{}", e),
            Self::Reconcile(e) => write!(f, "{}", e),
            Self::Delete(e) => write!(f, "{}", e),
            Self::DeleteMany(e) => write!(f, "{}", e),
            Self::AssignGroup(e) => write!(f, "{}", e),
            Self::UpdateStatus(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_stale_snapshot_is_conflict() {
        let err = MateriaApiError::from(ReconcileMateriasError::RowNotFound(9));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_columns_is_bad_request() {
        let err = MateriaApiError::from(ImportMateriasError::Validation(
            ImportValidationError::MissingColumns(BTreeSet::from(["turma".to_string()])),
        ));
        assert!(err.to_string().contains("turma"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err = MateriaApiError::from(DeleteMateriaError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_routes_structure() {
        let router = materias_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
