//! Schedule mutation propagation.
//!
//! Instructor reassignment, deactivation, and reactivation each run in
//! one transaction that locks the schedule row first, so they
//! serialize per schedule and the cascade over future events commits
//! atomically with the schedule change.

use chrono::NaiveDate;
use sqlx::PgPool;

use classtrack_core::types::DbId;
use classtrack_core::CoreError;
use classtrack_db::models::schedule::Schedule;
use classtrack_db::repositories::{InstructorRepo, LessonEventRepo, ScheduleRepo};

use crate::error::EngineError;

/// A schedule mutation plus how many future events it touched.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PropagationResult {
    pub schedule: Schedule,
    pub events_affected: u64,
}

/// Move a schedule to a new instructor.
///
/// Future PLANNED occurrences follow the new instructor and have
/// their delivery state reset so the reminder reaches the right
/// person. SENT and COMPLETED events keep their historical instructor.
pub async fn reassign_instructor(
    pool: &PgPool,
    schedule_id: DbId,
    new_instructor_id: DbId,
    today: NaiveDate,
) -> Result<PropagationResult, EngineError> {
    let instructor = InstructorRepo::find_by_id(pool, new_instructor_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instructor",
            id: new_instructor_id,
        })?;
    if !instructor.is_active {
        return Err(CoreError::Validation(format!(
            "instructor {new_instructor_id} is inactive"
        ))
        .into());
    }

    let mut tx = pool.begin().await?;

    let Some(mut schedule) = ScheduleRepo::find_by_id_for_update(&mut *tx, schedule_id).await?
    else {
        return Err(CoreError::NotFound {
            entity: "schedule",
            id: schedule_id,
        }
        .into());
    };

    ScheduleRepo::set_instructor(&mut *tx, schedule_id, new_instructor_id).await?;
    let events_affected = LessonEventRepo::reassign_planned_future(
        &mut *tx,
        schedule_id,
        new_instructor_id,
        instructor.chat_id,
        today,
    )
    .await?;

    tx.commit().await?;
    schedule.instructor_id = new_instructor_id;

    tracing::info!(
        schedule_id,
        new_instructor_id,
        events_affected,
        "Schedule reassigned",
    );
    Ok(PropagationResult {
        schedule,
        events_affected,
    })
}

/// Deactivate a schedule and cancel its future PLANNED occurrences.
/// Past events and already-notified ones are untouched.
pub async fn deactivate_schedule(
    pool: &PgPool,
    schedule_id: DbId,
    today: NaiveDate,
) -> Result<PropagationResult, EngineError> {
    let mut tx = pool.begin().await?;

    let Some(mut schedule) = ScheduleRepo::find_by_id_for_update(&mut *tx, schedule_id).await?
    else {
        return Err(CoreError::NotFound {
            entity: "schedule",
            id: schedule_id,
        }
        .into());
    };
    if !schedule.is_active {
        return Err(CoreError::Conflict(format!(
            "schedule {schedule_id} is already inactive"
        ))
        .into());
    }

    ScheduleRepo::set_active(&mut *tx, schedule_id, false).await?;
    let events_affected =
        LessonEventRepo::cancel_planned_future(&mut *tx, schedule_id, today).await?;

    tx.commit().await?;
    schedule.is_active = false;

    tracing::info!(schedule_id, events_affected, "Schedule deactivated");
    Ok(PropagationResult {
        schedule,
        events_affected,
    })
}

/// Reactivate a schedule, restoring future CANCELLED occurrences to
/// PLANNED. The next generation cycle fills in any dates that were
/// never materialized.
pub async fn reactivate_schedule(
    pool: &PgPool,
    schedule_id: DbId,
    today: NaiveDate,
) -> Result<PropagationResult, EngineError> {
    let mut tx = pool.begin().await?;

    let Some(mut schedule) = ScheduleRepo::find_by_id_for_update(&mut *tx, schedule_id).await?
    else {
        return Err(CoreError::NotFound {
            entity: "schedule",
            id: schedule_id,
        }
        .into());
    };
    if schedule.is_active {
        return Err(CoreError::Conflict(format!(
            "schedule {schedule_id} is already active"
        ))
        .into());
    }

    ScheduleRepo::set_active(&mut *tx, schedule_id, true).await?;
    let events_affected =
        LessonEventRepo::restore_cancelled_future(&mut *tx, schedule_id, today).await?;

    tx.commit().await?;
    schedule.is_active = true;

    tracing::info!(schedule_id, events_affected, "Schedule reactivated");
    Ok(PropagationResult {
        schedule,
        events_affected,
    })
}
