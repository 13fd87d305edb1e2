use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use classtrack_core::types::{DbId, Timestamp};

/// A row from the `schedule_enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub schedule_id: DbId,
    pub student_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for enrolling a student into a schedule.
#[derive(Debug, Deserialize)]
pub struct EnrollStudent {
    pub student_id: DbId,
}

/// A roster entry: the subset of student data the engine needs when
/// rendering reminders and recording attendance.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RosterStudent {
    pub id: DbId,
    pub full_name: String,
}
