//! Repository for the `lesson_events` table.
//!
//! Two access patterns here are load-bearing for correctness:
//!
//! - [`LessonEventRepo::insert_planned`] relies on the partial unique
//!   index on (schedule_id, date) plus `ON CONFLICT DO NOTHING`, which
//!   makes concurrent generator runs idempotent without any locking.
//! - [`LessonEventRepo::lock_next_due`] uses
//!   `SELECT ... FOR UPDATE SKIP LOCKED` inside a caller-owned
//!   transaction so that racing dispatcher instances never claim the
//!   same due event. The claim also serializes against administrative
//!   cancellation, which goes through a conditional update guarded on
//!   the current status.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use classtrack_core::lifecycle::EventStatus;
use classtrack_core::types::{DbId, Timestamp};

use crate::models::lesson_event::{CreateAdHocLesson, EventListQuery, LessonEvent};

/// Column list for `lesson_events` queries.
const COLUMNS: &str = "\
    id, schedule_id, activity_id, instructor_id, date, start_at, notify_at, \
    status, sent_at, completed_at, instructor_chat_id, send_attempts, \
    last_error, idempotency_key, created_at, updated_at";

/// Maximum page size for event listing.
const MAX_LIMIT: i64 = 200;

/// Default page size for event listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides persistence operations for lesson events.
pub struct LessonEventRepo;

impl LessonEventRepo {
    /// Insert a PLANNED occurrence for a schedule if none exists yet.
    ///
    /// Returns `Some(event)` when a new row was created and `None` when
    /// the (schedule_id, date) pair already had one — the idempotent
    /// skip of the generation path.
    pub async fn insert_planned(
        pool: &PgPool,
        schedule_id: DbId,
        activity_id: Option<DbId>,
        instructor_id: DbId,
        instructor_chat_id: Option<i64>,
        date: NaiveDate,
        start_at: Timestamp,
        notify_at: Timestamp,
    ) -> Result<Option<LessonEvent>, sqlx::Error> {
        let query = format!(
            "INSERT INTO lesson_events \
                 (schedule_id, activity_id, instructor_id, instructor_chat_id, \
                  date, start_at, notify_at, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (schedule_id, date) WHERE schedule_id IS NOT NULL \
                 DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LessonEvent>(&query)
            .bind(schedule_id)
            .bind(activity_id)
            .bind(instructor_id)
            .bind(instructor_chat_id)
            .bind(date)
            .bind(start_at)
            .bind(notify_at)
            .bind(EventStatus::Planned.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Insert an ad hoc lesson with a caller-supplied idempotency key.
    ///
    /// A duplicate key surfaces as a unique violation for the API
    /// layer to map to 409.
    pub async fn insert_ad_hoc(
        pool: &PgPool,
        input: &CreateAdHocLesson,
        instructor_chat_id: Option<i64>,
        notify_at: Timestamp,
    ) -> Result<LessonEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO lesson_events \
                 (schedule_id, activity_id, instructor_id, instructor_chat_id, \
                  date, start_at, notify_at, status, idempotency_key) \
             VALUES (NULL, $1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LessonEvent>(&query)
            .bind(input.activity_id)
            .bind(input.instructor_id)
            .bind(instructor_chat_id)
            .bind(input.date)
            .bind(input.start_at)
            .bind(notify_at)
            .bind(EventStatus::Planned.as_str())
            .bind(&input.idempotency_key)
            .fetch_one(pool)
            .await
    }

    /// Claim the oldest due, still-unnotified event for exclusive
    /// dispatch within the caller's transaction.
    ///
    /// `FOR UPDATE SKIP LOCKED` guarantees that of N racing dispatcher
    /// workers exactly one sees any given row; the others simply move
    /// on to the next due event or find nothing. The row stays locked
    /// until the caller commits, so the subsequent status update in
    /// the same transaction cannot race a cancellation.
    ///
    /// `exclude` holds ids the caller already attempted this cycle: a
    /// failed send leaves the event PLANNED and still due, and without
    /// the exclusion a draining loop would re-claim it immediately.
    pub async fn lock_next_due(
        conn: &mut PgConnection,
        now: Timestamp,
        exclude: &[DbId],
    ) -> Result<Option<LessonEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lesson_events \
             WHERE status = $1 \
               AND notify_at <= $2 \
               AND instructor_chat_id IS NOT NULL \
               AND id <> ALL($3) \
             ORDER BY notify_at ASC \
             LIMIT 1 \
             FOR UPDATE SKIP LOCKED"
        );
        sqlx::query_as::<_, LessonEvent>(&query)
            .bind(EventStatus::Planned.as_str())
            .bind(now)
            .bind(exclude)
            .fetch_optional(conn)
            .await
    }

    /// Transition a claimed event to SENT after successful delivery.
    pub async fn mark_sent(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, sent_at = $3, send_attempts = send_attempts + 1, \
                 last_error = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(EventStatus::Sent.as_str())
        .bind(now)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Record a delivery failure; the event stays PLANNED and becomes
    /// eligible again on the next dispatcher run.
    pub async fn record_send_failure(
        conn: &mut PgConnection,
        id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE lesson_events \
             SET send_attempts = send_attempts + 1, last_error = $2, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Transition a claimed PLANNED event to SKIPPED with a reason
    /// (stale notification window, empty roster).
    pub async fn mark_skipped(
        conn: &mut PgConnection,
        id: DbId,
        reason: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, last_error = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(EventStatus::Skipped.as_str())
        .bind(reason)
        .bind(EventStatus::Planned.as_str())
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Transition an event to COMPLETED as part of attendance
    /// recording. Runs in the recorder's transaction.
    pub async fn mark_completed(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, completed_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(EventStatus::Completed.as_str())
        .bind(now)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Cancel a PLANNED event. The status guard makes this safe
    /// against a concurrent dispatcher claim: whichever side commits
    /// first wins, the other sees a changed status.
    ///
    /// Returns `false` when the event was no longer PLANNED.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(EventStatus::Cancelled.as_str())
        .bind(EventStatus::Planned.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Administratively skip a PLANNED or SENT event (holiday,
    /// instructor illness).
    pub async fn skip(pool: &PgPool, id: DbId, reason: Option<&str>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, last_error = $3, updated_at = NOW() \
             WHERE id = $1 AND status IN ($4, $5)",
        )
        .bind(id)
        .bind(EventStatus::Skipped.as_str())
        .bind(reason)
        .bind(EventStatus::Planned.as_str())
        .bind(EventStatus::Sent.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reset a SENT/SKIPPED/CANCELLED event back to PLANNED (admin
    /// correction). Completed events are excluded; their attendance
    /// and payroll records must not be silently orphaned.
    pub async fn reset_to_planned(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, sent_at = NULL, completed_at = NULL, \
                 send_attempts = 0, last_error = NULL, updated_at = NOW() \
             WHERE id = $1 AND status IN ($3, $4, $5)",
        )
        .bind(id)
        .bind(EventStatus::Planned.as_str())
        .bind(EventStatus::Sent.as_str())
        .bind(EventStatus::Skipped.as_str())
        .bind(EventStatus::Cancelled.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move all not-yet-notified future occurrences of a schedule to a
    /// new instructor, resetting delivery state so they are re-notified
    /// to the right person. SENT and COMPLETED events keep their
    /// historical instructor.
    ///
    /// Returns the number of events touched.
    pub async fn reassign_planned_future(
        conn: &mut PgConnection,
        schedule_id: DbId,
        new_instructor_id: DbId,
        new_chat_id: Option<i64>,
        today: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lesson_events \
             SET instructor_id = $2, instructor_chat_id = $3, \
                 sent_at = NULL, send_attempts = 0, last_error = NULL, \
                 updated_at = NOW() \
             WHERE schedule_id = $1 AND status = $4 AND date >= $5",
        )
        .bind(schedule_id)
        .bind(new_instructor_id)
        .bind(new_chat_id)
        .bind(EventStatus::Planned.as_str())
        .bind(today)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Cancel all future PLANNED occurrences of a schedule (schedule
    /// deactivation cascade).
    pub async fn cancel_planned_future(
        conn: &mut PgConnection,
        schedule_id: DbId,
        today: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, updated_at = NOW() \
             WHERE schedule_id = $1 AND status = $3 AND date >= $4",
        )
        .bind(schedule_id)
        .bind(EventStatus::Cancelled.as_str())
        .bind(EventStatus::Planned.as_str())
        .bind(today)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Restore future CANCELLED occurrences to PLANNED (schedule
    /// reactivation cascade, the inverse of deactivation).
    pub async fn restore_cancelled_future(
        conn: &mut PgConnection,
        schedule_id: DbId,
        today: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE lesson_events \
             SET status = $2, updated_at = NOW() \
             WHERE schedule_id = $1 AND status = $3 AND date >= $4",
        )
        .bind(schedule_id)
        .bind(EventStatus::Planned.as_str())
        .bind(EventStatus::Cancelled.as_str())
        .bind(today)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find an event by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LessonEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lesson_events WHERE id = $1");
        sqlx::query_as::<_, LessonEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an event by ID inside a transaction, locking the row so
    /// attendance recording is serialized per event.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<LessonEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lesson_events WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, LessonEvent>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List events with optional filters and pagination.
    pub async fn list(
        pool: &PgPool,
        params: &EventListQuery,
    ) -> Result<Vec<LessonEvent>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.schedule_id.is_some() {
            conditions.push(format!("schedule_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.instructor_id.is_some() {
            conditions.push(format!("instructor_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.date_from.is_some() {
            conditions.push(format!("date >= ${bind_idx}"));
            bind_idx += 1;
        }
        if params.date_to.is_some() {
            conditions.push(format!("date <= ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM lesson_events \
             {where_clause} \
             ORDER BY date ASC, start_at ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, LessonEvent>(&query);

        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        if let Some(schedule_id) = params.schedule_id {
            q = q.bind(schedule_id);
        }
        if let Some(instructor_id) = params.instructor_id {
            q = q.bind(instructor_id);
        }
        if let Some(date_from) = params.date_from {
            q = q.bind(date_from);
        }
        if let Some(date_to) = params.date_to {
            q = q.bind(date_to);
        }

        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
