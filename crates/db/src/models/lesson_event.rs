//! Lesson event entity and DTOs.
//!
//! A lesson event is one dated occurrence of a schedule (or an ad hoc
//! lesson created without one). It is the single entity the lifecycle
//! engine owns end to end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use classtrack_core::lifecycle::EventStatus;
use classtrack_core::types::{DbId, Timestamp};

/// A row from the `lesson_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonEvent {
    pub id: DbId,
    /// `None` for ad hoc lessons.
    pub schedule_id: Option<DbId>,
    pub activity_id: Option<DbId>,
    pub instructor_id: DbId,
    pub date: NaiveDate,
    pub start_at: Timestamp,
    pub notify_at: Timestamp,
    /// TEXT status code; see [`LessonEvent::status`].
    pub status: String,
    pub sent_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub instructor_chat_id: Option<i64>,
    pub send_attempts: i32,
    pub last_error: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LessonEvent {
    /// Typed view of the raw status column. The CHECK constraint keeps
    /// the column within the known codes, so `parse` only fails on a
    /// row written by something other than this codebase.
    pub fn status(&self) -> Option<EventStatus> {
        EventStatus::parse(&self.status)
    }
}

/// DTO for creating an ad hoc lesson via `POST /lesson-events`.
///
/// The caller supplies the idempotency key; submitting the same key
/// twice yields a conflict rather than a duplicate lesson.
#[derive(Debug, Deserialize)]
pub struct CreateAdHocLesson {
    pub instructor_id: DbId,
    pub activity_id: Option<DbId>,
    pub date: NaiveDate,
    pub start_at: Timestamp,
    pub idempotency_key: String,
}

/// Query parameters for `GET /lesson-events`.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    /// Filter by status code (e.g. `PLANNED`, `SKIPPED`).
    pub status: Option<String>,
    pub schedule_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Maximum number of results. Defaults to 50, capped at 200.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
