//! Attendance recording.
//!
//! Turns one attendance submission into marks, a conducted-lesson
//! summary, a COMPLETED event, and (when eligible) a payroll entry.
//! Everything runs in a single transaction keyed on a `FOR UPDATE`
//! lock of the event row, so concurrent submissions for the same
//! lesson serialize instead of interleaving.

use std::collections::HashSet;

use sqlx::PgPool;

use classtrack_core::attendance::AttendanceStats;
use classtrack_core::lifecycle::EventStatus;
use classtrack_core::types::{DbId, Timestamp};
use classtrack_core::CoreError;
use classtrack_db::models::attendance::{RecordAttendance, STATUS_ABSENT, STATUS_PRESENT};
use classtrack_db::models::conducted_lesson::ConductedLesson;
use classtrack_db::repositories::{
    ActivityRepo, AttendanceRepo, ConductedLessonRepo, LessonEventRepo, ScheduleRepo,
};

use crate::error::EngineError;
use crate::payroll::PayrollDeriver;

/// Records attendance and completes lesson events.
pub struct AttendanceRecorder {
    pool: PgPool,
}

impl AttendanceRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record attendance for a lesson event.
    ///
    /// Accepted from SENT (the normal flow), PLANNED (the notification
    /// never went out but the lesson happened anyway), and COMPLETED
    /// (an idempotent correction that overwrites marks and totals).
    /// CANCELLED and SKIPPED events reject the submission.
    ///
    /// For scheduled events the roster defines who gets a mark:
    /// students in `present_student_ids` are PRESENT, the rest of the
    /// roster ABSENT, and ids outside the roster are ignored. Ad hoc
    /// events have no roster, so the submitted ids are taken as the
    /// full attendee list.
    pub async fn record(
        &self,
        event_id: DbId,
        input: &RecordAttendance,
        now: Timestamp,
    ) -> Result<ConductedLesson, EngineError> {
        let mut tx = self.pool.begin().await?;

        let Some(event) = LessonEventRepo::find_by_id_for_update(&mut *tx, event_id).await? else {
            return Err(CoreError::NotFound {
                entity: "lesson_event",
                id: event_id,
            }
            .into());
        };

        match event.status() {
            Some(EventStatus::Sent | EventStatus::Planned | EventStatus::Completed) => {}
            Some(status) => {
                return Err(CoreError::InvalidTransition(format!(
                    "cannot record attendance for a {status} lesson"
                ))
                .into());
            }
            None => {
                return Err(CoreError::Internal(format!(
                    "lesson event {event_id} has unknown status {:?}",
                    event.status
                ))
                .into());
            }
        }

        let submitted: HashSet<DbId> = input.present_student_ids.iter().copied().collect();

        let stats = match event.schedule_id {
            Some(schedule_id) => {
                let roster = ScheduleRepo::roster(&mut *tx, schedule_id).await?;
                let mut present = 0usize;
                for student in &roster {
                    let is_present = submitted.contains(&student.id);
                    if is_present {
                        present += 1;
                    }
                    AttendanceRepo::upsert_mark(
                        &mut *tx,
                        event.id,
                        student.id,
                        if is_present { STATUS_PRESENT } else { STATUS_ABSENT },
                        input.marked_by,
                        now,
                    )
                    .await?;
                }
                AttendanceStats::from_counts(roster.len(), present)
            }
            None => {
                for student_id in &submitted {
                    AttendanceRepo::upsert_mark(
                        &mut *tx,
                        event.id,
                        *student_id,
                        STATUS_PRESENT,
                        input.marked_by,
                        now,
                    )
                    .await?;
                }
                AttendanceStats::from_counts(submitted.len(), submitted.len())
            }
        };

        let duration_minutes = match event.activity_id {
            Some(activity_id) => ActivityRepo::find_by_id(&mut *tx, activity_id)
                .await?
                .and_then(|a| a.duration_minutes),
            None => None,
        };

        let mut lesson = ConductedLessonRepo::upsert_for_event(
            &mut *tx,
            event.id,
            event.instructor_id,
            event.activity_id,
            event.start_at,
            duration_minutes,
            stats,
        )
        .await?;

        LessonEventRepo::mark_completed(&mut *tx, event.id, now).await?;

        if PayrollDeriver::derive(&mut *tx, &event, &lesson).await?.is_ok() {
            lesson.is_payroll_calculated = true;
        }

        tx.commit().await?;

        tracing::info!(
            event_id = event.id,
            total = stats.total,
            present = stats.present,
            "Attendance recorded",
        );
        Ok(lesson)
    }
}
