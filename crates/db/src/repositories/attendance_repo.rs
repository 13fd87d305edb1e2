//! Repository for the `attendance_marks` table.
//!
//! Marks are upserted against the (lesson_event_id, student_id)
//! unique constraint so that a re-submission overwrites rather than
//! duplicates.

use sqlx::PgConnection;

use classtrack_core::types::{DbId, Timestamp};

use crate::models::attendance::AttendanceMark;

const COLUMNS: &str = "id, lesson_event_id, student_id, status, marked_by, marked_at";

/// Provides persistence operations for attendance marks.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Upsert one student's mark for one lesson event.
    pub async fn upsert_mark(
        conn: &mut PgConnection,
        lesson_event_id: DbId,
        student_id: DbId,
        status: &str,
        marked_by: Option<i64>,
        marked_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO attendance_marks \
                 (lesson_event_id, student_id, status, marked_by, marked_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_attendance_event_student \
             DO UPDATE SET status = EXCLUDED.status, \
                           marked_by = EXCLUDED.marked_by, \
                           marked_at = EXCLUDED.marked_at",
        )
        .bind(lesson_event_id)
        .bind(student_id)
        .bind(status)
        .bind(marked_by)
        .bind(marked_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// All marks for a lesson event, ordered by student.
    pub async fn list_for_event(
        conn: &mut PgConnection,
        lesson_event_id: DbId,
    ) -> Result<Vec<AttendanceMark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance_marks \
             WHERE lesson_event_id = $1 ORDER BY student_id"
        );
        sqlx::query_as::<_, AttendanceMark>(&query)
            .bind(lesson_event_id)
            .fetch_all(conn)
            .await
    }
}
