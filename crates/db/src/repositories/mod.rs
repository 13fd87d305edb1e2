//! Stateless repository structs, one per aggregate.
//!
//! Repositories take an executor (pool or transaction) per call and
//! hold no state of their own.

pub mod activity_repo;
pub mod attendance_repo;
pub mod conducted_lesson_repo;
pub mod instructor_repo;
pub mod lesson_event_repo;
pub mod pay_rate_repo;
pub mod payroll_repo;
pub mod schedule_repo;
pub mod student_repo;

pub use activity_repo::ActivityRepo;
pub use attendance_repo::AttendanceRepo;
pub use conducted_lesson_repo::ConductedLessonRepo;
pub use instructor_repo::InstructorRepo;
pub use lesson_event_repo::LessonEventRepo;
pub use pay_rate_repo::PayRateRepo;
pub use payroll_repo::PayrollRepo;
pub use schedule_repo::ScheduleRepo;
pub use student_repo::StudentRepo;

/// True when the error is a Postgres unique-constraint violation
/// (SQLSTATE 23505), optionally restricted to a named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            match constraint {
                Some(name) => db_err.constraint() == Some(name),
                None => true,
            }
        }
        _ => false,
    }
}
