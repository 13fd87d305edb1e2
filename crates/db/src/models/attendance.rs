use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use classtrack_core::types::{DbId, Timestamp};

/// Attendance status codes persisted in `attendance_marks.status`.
pub const STATUS_PRESENT: &str = "PRESENT";
pub const STATUS_ABSENT: &str = "ABSENT";

/// A row from the `attendance_marks` table: one student's presence or
/// absence for one lesson event.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceMark {
    pub id: DbId,
    pub lesson_event_id: DbId,
    pub student_id: DbId,
    pub status: String,
    /// Who recorded the mark (chat ID of the submitting instructor).
    pub marked_by: Option<i64>,
    pub marked_at: Timestamp,
}

impl AttendanceMark {
    pub fn is_present(&self) -> bool {
        self.status == STATUS_PRESENT
    }
}

/// DTO for `POST /lesson-events/{id}/attendance`.
///
/// Students in `present_student_ids` are marked present; every other
/// enrolled student is marked absent. Re-submission overwrites.
#[derive(Debug, Deserialize)]
pub struct RecordAttendance {
    pub present_student_ids: Vec<DbId>,
    pub marked_by: Option<i64>,
}
