//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the write operations that touch the table

pub mod activity;
pub mod attendance;
pub mod conducted_lesson;
pub mod enrollment;
pub mod instructor;
pub mod lesson_event;
pub mod pay_rate;
pub mod payroll;
pub mod schedule;
pub mod student;
