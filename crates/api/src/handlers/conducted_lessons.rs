//! Handlers for the `/conducted-lessons` resource.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use classtrack_db::models::conducted_lesson::ConductedLessonQuery;
use classtrack_db::repositories::ConductedLessonRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/conducted-lessons
///
/// `?unpaid=true` narrows to lessons still awaiting payroll, the
/// review list for missing pay rates.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ConductedLessonQuery>,
) -> AppResult<impl IntoResponse> {
    let lessons = ConductedLessonRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: lessons }))
}
