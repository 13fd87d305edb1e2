//! Repository for the `conducted_lessons` table.

use sqlx::{PgConnection, PgPool};

use classtrack_core::attendance::AttendanceStats;
use classtrack_core::types::{DbId, Timestamp};

use crate::models::conducted_lesson::{ConductedLesson, ConductedLessonQuery};

const COLUMNS: &str = "\
    id, lesson_event_id, instructor_id, activity_id, lesson_date, \
    duration_minutes, total_students, present_students, absent_students, \
    is_payroll_calculated, created_at, updated_at";

const MAX_LIMIT: i64 = 200;
const DEFAULT_LIMIT: i64 = 50;

/// Provides persistence operations for conducted-lesson summaries.
pub struct ConductedLessonRepo;

impl ConductedLessonRepo {
    /// Create the summary for a lesson event, or update the totals if
    /// one already exists — the idempotent half of attendance
    /// re-submission. `is_payroll_calculated` is deliberately not
    /// reset on update; payroll derivation has its own guard.
    pub async fn upsert_for_event(
        conn: &mut PgConnection,
        lesson_event_id: DbId,
        instructor_id: DbId,
        activity_id: Option<DbId>,
        lesson_date: Timestamp,
        duration_minutes: Option<i32>,
        stats: AttendanceStats,
    ) -> Result<ConductedLesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO conducted_lessons \
                 (lesson_event_id, instructor_id, activity_id, lesson_date, \
                  duration_minutes, total_students, present_students, absent_students) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_conducted_lessons_event \
             DO UPDATE SET total_students = EXCLUDED.total_students, \
                           present_students = EXCLUDED.present_students, \
                           absent_students = EXCLUDED.absent_students, \
                           updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConductedLesson>(&query)
            .bind(lesson_event_id)
            .bind(instructor_id)
            .bind(activity_id)
            .bind(lesson_date)
            .bind(duration_minutes)
            .bind(stats.total)
            .bind(stats.present)
            .bind(stats.absent)
            .fetch_one(conn)
            .await
    }

    /// Flip the payroll flag once an entry has been derived.
    pub async fn mark_payroll_calculated(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE conducted_lessons \
             SET is_payroll_calculated = TRUE, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Find the summary for a lesson event, if any.
    pub async fn find_by_event(
        pool: &PgPool,
        lesson_event_id: DbId,
    ) -> Result<Option<ConductedLesson>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conducted_lessons WHERE lesson_event_id = $1"
        );
        sqlx::query_as::<_, ConductedLesson>(&query)
            .bind(lesson_event_id)
            .fetch_optional(pool)
            .await
    }

    /// List summaries; `unpaid = true` narrows to the manual review
    /// list of lessons still awaiting payroll.
    pub async fn list(
        pool: &PgPool,
        params: &ConductedLessonQuery,
    ) -> Result<Vec<ConductedLesson>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.unpaid {
            conditions.push("is_payroll_calculated = FALSE".to_string());
        }
        if params.instructor_id.is_some() {
            conditions.push(format!("instructor_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM conducted_lessons \
             {where_clause} \
             ORDER BY lesson_date DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, ConductedLesson>(&query);
        if let Some(instructor_id) = params.instructor_id {
            q = q.bind(instructor_id);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
