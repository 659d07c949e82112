//! Block deadline API routes
//!
//! - `GET /api/v1/blocos?grupo=3-1` - Registered blocks
//! - `POST /api/v1/blocos` - Register a block deadline

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::{
    commands::{CreateBlocoCommand, CreateBlocoError, CreateBlocoOutcome},
    queries::{ListBlocosError, ListBlocosQuery},
};
use crate::api::response::{error_response, internal_error, ApiResponse};
use crate::features::users::{AuthError, SessionContext};
use crate::features::FeatureState;

pub fn blocos_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_blocos).post(create_bloco))
}

/// Register a block deadline
///
/// # Response
///
/// - `201 Created` - `{"outcome": "created", "bloco": {...}}`
/// - `200 OK` - `{"outcome": "already_exists", "bloco": null}`
/// - `400 Bad Request` - Empty label or group
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn create_bloco(
    State(pool): State<PgPool>,
    session: SessionContext,
    Json(command): Json<CreateBlocoCommand>,
) -> Result<Response, BlocoApiError> {
    session.require_privileged()?;

    let response = super::commands::create::handle(pool, command).await?;
    let status = match response.outcome {
        CreateBlocoOutcome::Created => StatusCode::CREATED,
        CreateBlocoOutcome::AlreadyExists => StatusCode::OK,
    };

    Ok((status, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, _session))]
async fn list_blocos(
    State(pool): State<PgPool>,
    _session: SessionContext,
    Query(query): Query<ListBlocosQuery>,
) -> Result<Response, BlocoApiError> {
    let response = super::queries::list::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response.items))).into_response())
}

#[derive(Debug)]
enum BlocoApiError {
    Auth(AuthError),
    Create(CreateBlocoError),
    List(ListBlocosError),
}

impl From<AuthError> for BlocoApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<CreateBlocoError> for BlocoApiError {
    fn from(err: CreateBlocoError) -> Self {
        Self::Create(err)
    }
}

impl From<ListBlocosError> for BlocoApiError {
    fn from(err: ListBlocosError) -> Self {
        Self::List(err)
    }
}

impl IntoResponse for BlocoApiError {
    fn into_response(self) -> Response {
        match self {
            BlocoApiError::Auth(err) => err.into_response(),
            BlocoApiError::Create(
                ref err @ (CreateBlocoError::LabelValidation(_)
                | CreateBlocoError::GroupValidation(_)),
            ) => error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string()),
            BlocoApiError::Create(CreateBlocoError::Database(ref err)) => {
                internal_error("block registration", err)
            },
            BlocoApiError::List(ListBlocosError::Database(ref err)) => {
                internal_error("block listing", err)
            },
        }
    }
}
