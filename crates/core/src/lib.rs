//! Pure domain logic for the lesson lifecycle engine.
//!
//! This crate has zero internal dependencies so it can be used by the
//! database layer, the engine, and any future CLI tooling alike.
//! Nothing in here performs I/O.

pub mod attendance;
pub mod error;
pub mod lifecycle;
pub mod payrates;
pub mod recurrence;
pub mod staleness;
pub mod types;

pub use error::CoreError;
