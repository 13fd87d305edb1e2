//! Handlers for the `/instructors` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use classtrack_core::error::CoreError;
use classtrack_core::types::DbId;
use classtrack_db::models::instructor::{CreateInstructor, UpdateInstructor};
use classtrack_db::repositories::InstructorRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// POST /api/v1/instructors
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateInstructor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let instructor = InstructorRepo::create(&state.pool, &input).await?;
    tracing::info!(instructor_id = instructor.id, "Instructor created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: instructor })))
}

/// GET /api/v1/instructors
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let instructors = InstructorRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: instructors }))
}

/// GET /api/v1/instructors/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let instructor = InstructorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instructor",
            id,
        })?;
    Ok(Json(DataResponse { data: instructor }))
}

/// PATCH /api/v1/instructors/{id}
///
/// Partial update of name, chat ID, or active flag. Deactivating an
/// instructor does not touch existing events; schedules should be
/// reassigned or deactivated explicitly.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInstructor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let instructor = InstructorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instructor",
            id,
        })?;
    Ok(Json(DataResponse { data: instructor }))
}
