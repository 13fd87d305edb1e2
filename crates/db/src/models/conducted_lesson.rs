use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use classtrack_core::types::{DbId, Timestamp};

/// A row from the `conducted_lessons` table: the immutable attendance
/// summary created when a lesson event completes. Only
/// `is_payroll_calculated` (and the totals, on idempotent
/// re-submission of attendance) ever change after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConductedLesson {
    pub id: DbId,
    pub lesson_event_id: DbId,
    pub instructor_id: DbId,
    pub activity_id: Option<DbId>,
    pub lesson_date: Timestamp,
    pub duration_minutes: Option<i32>,
    pub total_students: i32,
    pub present_students: i32,
    pub absent_students: i32,
    pub is_payroll_calculated: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConductedLesson {
    /// Attendance rate in percent; 0.0 for an empty roster.
    pub fn attendance_rate(&self) -> f64 {
        if self.total_students == 0 {
            0.0
        } else {
            f64::from(self.present_students) / f64::from(self.total_students) * 100.0
        }
    }
}

/// Query parameters for `GET /conducted-lessons`.
#[derive(Debug, Deserialize)]
pub struct ConductedLessonQuery {
    /// When true, only lessons still awaiting payroll (manual review
    /// list for missing pay rates).
    #[serde(default)]
    pub unpaid: bool,
    pub instructor_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
