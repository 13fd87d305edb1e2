//! Handlers for the `/schedules` resource.
//!
//! Slot edits are plain column updates; instructor changes,
//! deactivation, and reactivation are routed through the engine's
//! propagators so future events stay consistent with the schedule.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use validator::Validate;

use classtrack_core::error::CoreError;
use classtrack_core::types::DbId;
use classtrack_db::models::enrollment::EnrollStudent;
use classtrack_db::models::schedule::{CreateSchedule, ScheduleListQuery, UpdateSchedule};
use classtrack_db::repositories::{InstructorRepo, ScheduleRepo, StudentRepo};
use classtrack_engine::reassignment;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/schedules
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSchedule>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if !input.times_ordered() {
        return Err(AppError::BadRequest(
            "start_time must be before end_time".into(),
        ));
    }

    let instructor = InstructorRepo::find_by_id(&state.pool, input.instructor_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instructor",
            id: input.instructor_id,
        })?;
    if !instructor.is_active {
        return Err(CoreError::Validation(format!(
            "instructor {} is inactive",
            instructor.id
        ))
        .into());
    }

    let schedule = ScheduleRepo::create(&state.pool, &input).await?;
    tracing::info!(schedule_id = schedule.id, "Schedule created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: schedule })))
}

/// GET /api/v1/schedules
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ScheduleListQuery>,
) -> AppResult<impl IntoResponse> {
    let schedules = ScheduleRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// GET /api/v1/schedules/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "schedule",
            id,
        })?;
    Ok(Json(DataResponse { data: schedule }))
}

/// PUT /api/v1/schedules/{id}
///
/// Merges the submitted fields over the current row. A changed
/// `instructor_id` goes through the reassignment propagator, which
/// also re-targets future PLANNED events.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSchedule>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "schedule",
            id,
        })?;

    let weekday = input.weekday.unwrap_or(current.weekday);
    let start_time = input.start_time.unwrap_or(current.start_time);
    let end_time = input.end_time.unwrap_or(current.end_time);
    if start_time >= end_time {
        return Err(AppError::BadRequest(
            "start_time must be before end_time".into(),
        ));
    }
    let activity_id = input.activity_id.or(current.activity_id);

    let mut schedule =
        ScheduleRepo::update_slot(&state.pool, id, activity_id, weekday, start_time, end_time)
            .await?;

    if let Some(new_instructor_id) = input.instructor_id {
        if new_instructor_id != current.instructor_id {
            let today = Utc::now().with_timezone(&state.engine.tz).date_naive();
            let result =
                reassignment::reassign_instructor(&state.pool, id, new_instructor_id, today)
                    .await?;
            schedule = result.schedule;
            tracing::info!(
                schedule_id = id,
                new_instructor_id,
                events_affected = result.events_affected,
                "Schedule instructor reassigned",
            );
        }
    }

    Ok(Json(DataResponse { data: schedule }))
}

/// POST /api/v1/schedules/{id}/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().with_timezone(&state.engine.tz).date_naive();
    let result = reassignment::deactivate_schedule(&state.pool, id, today).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/schedules/{id}/reactivate
pub async fn reactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().with_timezone(&state.engine.tz).date_naive();
    let result = reassignment::reactivate_schedule(&state.pool, id, today).await?;
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/schedules/{id}/enrollments
pub async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EnrollStudent>,
) -> AppResult<impl IntoResponse> {
    ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "schedule",
            id,
        })?;
    let student = StudentRepo::find_by_id(&state.pool, input.student_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "student",
            id: input.student_id,
        })?;
    if !student.is_active {
        return Err(
            CoreError::Validation(format!("student {} is inactive", student.id)).into(),
        );
    }

    ScheduleRepo::enroll(&state.pool, id, input.student_id).await?;
    tracing::info!(schedule_id = id, student_id = input.student_id, "Student enrolled");
    Ok(StatusCode::CREATED)
}

/// DELETE /api/v1/schedules/{id}/enrollments/{student_id}
pub async fn unenroll(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let removed = ScheduleRepo::unenroll(&state.pool, id, student_id).await?;
    if !removed {
        return Err(CoreError::NotFound {
            entity: "enrollment",
            id: student_id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/schedules/{id}/roster
pub async fn roster(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "schedule",
            id,
        })?;
    let mut conn = state.pool.acquire().await?;
    let roster = ScheduleRepo::roster(&mut conn, id).await?;
    Ok(Json(DataResponse { data: roster }))
}
