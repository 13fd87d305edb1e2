//! Handlers for the `/students` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use classtrack_core::error::CoreError;
use classtrack_core::types::DbId;
use classtrack_db::models::student::CreateStudent;
use classtrack_db::repositories::StudentRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetActive {
    pub is_active: bool,
}

/// POST /api/v1/students
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateStudent>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let student = StudentRepo::create(&state.pool, &input).await?;
    tracing::info!(student_id = student.id, "Student created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}

/// GET /api/v1/students
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let students = StudentRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: students }))
}

/// GET /api/v1/students/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let student = StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "student",
            id,
        })?;
    Ok(Json(DataResponse { data: student }))
}

/// PATCH /api/v1/students/{id}
///
/// Flips the active flag. Inactive students stay on rosters they were
/// already enrolled in; unenroll them explicitly to stop marks.
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetActive>,
) -> AppResult<impl IntoResponse> {
    let student = StudentRepo::set_active(&state.pool, id, input.is_active)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "student",
            id,
        })?;
    Ok(Json(DataResponse { data: student }))
}
