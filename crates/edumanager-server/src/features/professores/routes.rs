//! Teacher API routes
//!
//! - `GET /api/v1/professores` - Sorted teacher names
//! - `POST /api/v1/professores` - Register a name (insert-or-ignore)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::{
    commands::{CreateProfessorCommand, CreateProfessorError},
    queries::ListProfessoresError,
};
use crate::api::response::{error_response, internal_error, ApiResponse};
use crate::features::users::{AuthError, SessionContext};
use crate::features::FeatureState;

pub fn professores_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_professores).post(create_professor))
}

/// `201 Created` for a new name, `200 OK` when it already existed
#[tracing::instrument(skip(pool, session, command), fields(by = %session.email))]
async fn create_professor(
    State(pool): State<PgPool>,
    session: SessionContext,
    Json(command): Json<CreateProfessorCommand>,
) -> Result<Response, ProfessorApiError> {
    session.require_privileged()?;

    let response = super::commands::create::handle(pool, command).await?;
    let status = if response.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, _session))]
async fn list_professores(
    State(pool): State<PgPool>,
    _session: SessionContext,
) -> Result<Response, ProfessorApiError> {
    let response = super::queries::list::handle(pool).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response.items))).into_response())
}

#[derive(Debug)]
enum ProfessorApiError {
    Auth(AuthError),
    Create(CreateProfessorError),
    List(ListProfessoresError),
}

impl From<AuthError> for ProfessorApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<CreateProfessorError> for ProfessorApiError {
    fn from(err: CreateProfessorError) -> Self {
        Self::Create(err)
    }
}

impl From<ListProfessoresError> for ProfessorApiError {
    fn from(err: ListProfessoresError) -> Self {
        Self::List(err)
    }
}

impl IntoResponse for ProfessorApiError {
    fn into_response(self) -> Response {
        match self {
            ProfessorApiError::Auth(err) => err.into_response(),
            ProfessorApiError::Create(CreateProfessorError::NameValidation(ref err)) => {
                error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            },
            ProfessorApiError::Create(CreateProfessorError::Database(ref err)) => {
                internal_error("teacher registration", err)
            },
            ProfessorApiError::List(ListProfessoresError::Database(ref err)) => {
                internal_error("teacher listing", err)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        assert!(format!("{:?}", professores_routes()).contains("Router"));
    }
}
