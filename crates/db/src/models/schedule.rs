use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use classtrack_core::types::{DbId, Timestamp};

/// A row from the `schedules` table: one recurring weekly slot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: DbId,
    pub activity_id: Option<DbId>,
    pub instructor_id: DbId,
    /// ISO weekday: 1 = Monday .. 7 = Sunday.
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a schedule.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSchedule {
    pub activity_id: Option<DbId>,
    pub instructor_id: DbId,
    #[validate(range(min = 1, max = 7))]
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl CreateSchedule {
    /// Time-order invariant the CHECK constraint also enforces;
    /// validated up front for a friendlier error.
    pub fn times_ordered(&self) -> bool {
        self.start_time < self.end_time
    }
}

/// DTO for updating a schedule. An `instructor_id` change is routed
/// through the reassignment propagator, not a plain column update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSchedule {
    pub activity_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    #[validate(range(min = 1, max = 7))]
    pub weekday: Option<i16>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Query parameters for `GET /schedules`.
#[derive(Debug, Deserialize)]
pub struct ScheduleListQuery {
    /// Include deactivated schedules. Defaults to false.
    #[serde(default)]
    pub include_inactive: bool,
    pub instructor_id: Option<DbId>,
}

/// Human-readable slot description used in reminder payloads,
/// e.g. `17:00-18:00`.
pub fn format_slot(start: NaiveTime, end: NaiveTime) -> String {
    format!(
        "{:02}:{:02}-{:02}:{:02}",
        start.hour(),
        start.minute(),
        end.hour(),
        end.minute()
    )
}
