//! Handlers for the `/activities` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use classtrack_core::error::CoreError;
use classtrack_core::types::DbId;
use classtrack_db::models::activity::CreateActivity;
use classtrack_db::repositories::ActivityRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// POST /api/v1/activities
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateActivity>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let activity = ActivityRepo::create(&state.pool, &input).await?;
    tracing::info!(activity_id = activity.id, "Activity created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: activity })))
}

/// GET /api/v1/activities
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let activities = ActivityRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: activities }))
}

/// GET /api/v1/activities/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let activity = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "activity",
            id,
        })?;
    Ok(Json(DataResponse { data: activity }))
}
