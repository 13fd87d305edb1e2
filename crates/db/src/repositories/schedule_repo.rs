//! Repository for the `schedules` and `schedule_enrollments` tables.

use sqlx::{PgConnection, PgExecutor, PgPool};

use classtrack_core::types::DbId;

use crate::models::enrollment::RosterStudent;
use crate::models::schedule::{CreateSchedule, Schedule, ScheduleListQuery};

/// Column list for `schedules` queries.
const COLUMNS: &str = "\
    id, activity_id, instructor_id, weekday, start_time, end_time, \
    is_active, created_at, updated_at";

/// Provides persistence operations for schedules and their rosters.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Create a new active schedule.
    pub async fn create(pool: &PgPool, input: &CreateSchedule) -> Result<Schedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedules (activity_id, instructor_id, weekday, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(input.activity_id)
            .bind(input.instructor_id)
            .bind(input.weekday)
            .bind(input.start_time)
            .bind(input.end_time)
            .fetch_one(pool)
            .await
    }

    /// Find a schedule by its ID. Takes any executor: the dispatcher
    /// reads the slot on its claiming transaction's connection.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a schedule inside a transaction, locking the row so
    /// reassignment and deactivation serialize per schedule.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List schedules, active-only by default.
    pub async fn list(
        pool: &PgPool,
        params: &ScheduleListQuery,
    ) -> Result<Vec<Schedule>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();

        if !params.include_inactive {
            conditions.push("is_active = TRUE".to_string());
        }
        if params.instructor_id.is_some() {
            conditions.push("instructor_id = $1".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM schedules {where_clause} ORDER BY weekday, start_time"
        );

        let mut q = sqlx::query_as::<_, Schedule>(&query);
        if let Some(instructor_id) = params.instructor_id {
            q = q.bind(instructor_id);
        }
        q.fetch_all(pool).await
    }

    /// All active schedules — the generator's work list.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Schedule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM schedules WHERE is_active = TRUE ORDER BY id");
        sqlx::query_as::<_, Schedule>(&query).fetch_all(pool).await
    }

    /// Update the slot fields (weekday/times/activity). Instructor
    /// changes go through the reassignment propagator instead.
    pub async fn update_slot(
        pool: &PgPool,
        id: DbId,
        activity_id: Option<DbId>,
        weekday: i16,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
    ) -> Result<Schedule, sqlx::Error> {
        let query = format!(
            "UPDATE schedules \
             SET activity_id = $2, weekday = $3, start_time = $4, end_time = $5, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .bind(activity_id)
            .bind(weekday)
            .bind(start_time)
            .bind(end_time)
            .fetch_one(pool)
            .await
    }

    /// Set the instructor column. Part of the reassignment transaction.
    pub async fn set_instructor(
        conn: &mut PgConnection,
        id: DbId,
        instructor_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE schedules SET instructor_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(instructor_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Flip the active flag. Part of the deactivation/reactivation
    /// transactions.
    pub async fn set_active(
        conn: &mut PgConnection,
        id: DbId,
        active: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE schedules SET is_active = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(conn)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Enrollment / roster
    // -----------------------------------------------------------------------

    /// Enroll a student. A duplicate enrollment surfaces as a unique
    /// violation on `uq_schedule_enrollments`.
    pub async fn enroll(
        pool: &PgPool,
        schedule_id: DbId,
        student_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO schedule_enrollments (schedule_id, student_id) VALUES ($1, $2)",
        )
        .bind(schedule_id)
        .bind(student_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove an enrollment. Returns `false` when it did not exist.
    pub async fn unenroll(
        pool: &PgPool,
        schedule_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM schedule_enrollments WHERE schedule_id = $1 AND student_id = $2",
        )
        .bind(schedule_id)
        .bind(student_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The live roster of a schedule, ordered by student ID. Queried
    /// at dispatch and attendance time so late enrollment changes are
    /// always reflected.
    pub async fn roster(
        conn: &mut PgConnection,
        schedule_id: DbId,
    ) -> Result<Vec<RosterStudent>, sqlx::Error> {
        sqlx::query_as::<_, RosterStudent>(
            "SELECT s.id, s.full_name \
             FROM students s \
             JOIN schedule_enrollments e ON e.student_id = s.id \
             WHERE e.schedule_id = $1 \
             ORDER BY s.id",
        )
        .bind(schedule_id)
        .fetch_all(conn)
        .await
    }
}
