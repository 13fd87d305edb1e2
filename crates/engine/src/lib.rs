//! The lesson lifecycle engine.
//!
//! Four cooperating pieces drive an event from a weekly schedule to a
//! paid lesson:
//!
//! - [`generator::OccurrenceGenerator`] materializes dated PLANNED
//!   events from active schedules over a rolling window.
//! - [`dispatcher::NotificationDispatcher`] claims due events one at a
//!   time and delivers instructor reminders through a
//!   [`channel::NotificationChannel`].
//! - [`recorder::AttendanceRecorder`] turns an attendance submission
//!   into marks, a conducted-lesson summary, and (when eligible) a
//!   payroll entry, all in one transaction.
//! - [`reassignment`] propagates instructor changes and schedule
//!   deactivation to not-yet-notified future events.

pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod payroll;
pub mod reassignment;
pub mod recorder;
pub mod render;

pub use config::EngineConfig;
pub use error::EngineError;
