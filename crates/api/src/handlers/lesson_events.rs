//! Handlers for the `/lesson-events` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use classtrack_core::error::CoreError;
use classtrack_core::recurrence::notify_deadline;
use classtrack_core::types::DbId;
use classtrack_db::models::attendance::RecordAttendance;
use classtrack_db::models::lesson_event::{CreateAdHocLesson, EventListQuery};
use classtrack_db::repositories::{
    AttendanceRepo, ConductedLessonRepo, InstructorRepo, LessonEventRepo,
};
use classtrack_engine::recorder::AttendanceRecorder;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SkipBody {
    pub reason: Option<String>,
}

/// POST /api/v1/lesson-events
///
/// Create an ad hoc lesson (no schedule). A repeated idempotency key
/// maps to 409 via the unique constraint.
pub async fn create_ad_hoc(
    State(state): State<AppState>,
    Json(input): Json<CreateAdHocLesson>,
) -> AppResult<impl IntoResponse> {
    if input.idempotency_key.trim().is_empty() {
        return Err(AppError::BadRequest("idempotency_key must not be empty".into()));
    }
    if input.start_at <= Utc::now() {
        return Err(AppError::BadRequest("start_at must be in the future".into()));
    }

    let instructor = InstructorRepo::find_by_id(&state.pool, input.instructor_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instructor",
            id: input.instructor_id,
        })?;

    let notify_at = notify_deadline(input.start_at, state.engine.lead_time);
    let event =
        LessonEventRepo::insert_ad_hoc(&state.pool, &input, instructor.chat_id, notify_at).await?;

    tracing::info!(event_id = event.id, "Ad hoc lesson created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/lesson-events
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<EventListQuery>,
) -> AppResult<impl IntoResponse> {
    let events = LessonEventRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/lesson-events/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = LessonEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lesson_event",
            id,
        })?;
    Ok(Json(DataResponse { data: event }))
}

/// POST /api/v1/lesson-events/{id}/cancel
///
/// Only PLANNED events can be cancelled; anything else is a conflict.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = LessonEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lesson_event",
            id,
        })?;

    if !LessonEventRepo::cancel(&state.pool, id).await? {
        return Err(CoreError::InvalidTransition(format!(
            "cannot cancel a {} lesson",
            event.status
        ))
        .into());
    }
    fetch_updated(&state, id).await
}

/// POST /api/v1/lesson-events/{id}/skip
///
/// Administrative skip for PLANNED or SENT events (holiday, illness).
pub async fn skip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SkipBody>,
) -> AppResult<impl IntoResponse> {
    let event = LessonEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lesson_event",
            id,
        })?;

    if !LessonEventRepo::skip(&state.pool, id, body.reason.as_deref()).await? {
        return Err(CoreError::InvalidTransition(format!(
            "cannot skip a {} lesson",
            event.status
        ))
        .into());
    }
    fetch_updated(&state, id).await
}

/// POST /api/v1/lesson-events/{id}/reset
///
/// Admin correction: bring a SENT, SKIPPED, or CANCELLED event back to
/// PLANNED with fresh delivery state. COMPLETED events are immutable.
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = LessonEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lesson_event",
            id,
        })?;

    if !LessonEventRepo::reset_to_planned(&state.pool, id).await? {
        return Err(CoreError::InvalidTransition(format!(
            "cannot reset a {} lesson",
            event.status
        ))
        .into());
    }
    fetch_updated(&state, id).await
}

/// POST /api/v1/lesson-events/{id}/attendance
///
/// Record attendance, complete the event, and derive payroll when
/// eligible, all atomically. Returns the conducted-lesson summary.
pub async fn record_attendance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RecordAttendance>,
) -> AppResult<impl IntoResponse> {
    let recorder = AttendanceRecorder::new(state.pool.clone());
    let lesson = recorder.record(id, &input, Utc::now()).await?;
    Ok(Json(DataResponse { data: lesson }))
}

/// GET /api/v1/lesson-events/{id}/attendance
pub async fn list_attendance(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    LessonEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lesson_event",
            id,
        })?;
    let mut conn = state.pool.acquire().await?;
    let marks = AttendanceRepo::list_for_event(&mut conn, id).await?;
    Ok(Json(DataResponse { data: marks }))
}

/// GET /api/v1/lesson-events/{id}/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let lesson = ConductedLessonRepo::find_by_event(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "conducted_lesson",
            id,
        })?;
    Ok(Json(DataResponse { data: lesson }))
}

async fn fetch_updated(state: &AppState, id: DbId) -> AppResult<impl IntoResponse> {
    let event = LessonEventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "lesson_event",
            id,
        })?;
    Ok(Json(DataResponse { data: event }))
}
