//! Lesson event status codes and the state machine governing them.
//!
//! The status moves strictly forward:
//!
//! ```text
//! PLANNED ──▶ SENT ──▶ COMPLETED
//!    │  │        └───▶ SKIPPED
//!    │  ├───▶ COMPLETED          (ad hoc lessons, no prior reminder)
//!    │  ├───▶ CANCELLED
//!    │  └───▶ SKIPPED
//! ```
//!
//! COMPLETED, CANCELLED and SKIPPED are terminal with one deliberate
//! exception: an administrator may reset a terminal event back to
//! PLANNED to correct a mistake. That reset is modeled here as its own
//! operation ([`can_reset`]) rather than a regular transition, so the
//! forward-only property of the machine stays checkable.

use serde::{Deserialize, Serialize};

/// Status of a [lesson event] in its lifecycle.
///
/// Stored as TEXT in the `lesson_events.status` column; the string
/// codes are part of the persisted contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Generated, reminder not yet delivered.
    Planned,
    /// Reminder delivered to the instructor.
    Sent,
    /// Attendance recorded; summary exists.
    Completed,
    /// Did not happen without administrative cancellation
    /// (holiday, empty roster, expired notification window).
    Skipped,
    /// Administratively cancelled before notification.
    Cancelled,
}

impl EventStatus {
    /// The TEXT code persisted in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Planned => "PLANNED",
            EventStatus::Sent => "SENT",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Skipped => "SKIPPED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parse a persisted TEXT code.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "PLANNED" => Some(EventStatus::Planned),
            "SENT" => Some(EventStatus::Sent),
            "COMPLETED" => Some(EventStatus::Completed),
            "SKIPPED" => Some(EventStatus::Skipped),
            "CANCELLED" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal statuses admit no further forward transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventStatus::Completed | EventStatus::Skipped | EventStatus::Cancelled
        )
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the set of valid target statuses reachable from `from`.
pub fn valid_transitions(from: EventStatus) -> &'static [EventStatus] {
    use EventStatus::*;
    match from {
        Planned => &[Sent, Completed, Cancelled, Skipped],
        // No timeout forces completion; an unmarked SENT event stays
        // SENT until attendance arrives or an administrator skips it.
        Sent => &[Completed, Skipped],
        Completed | Skipped | Cancelled => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: EventStatus, to: EventStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, with a readable error for invalid ones.
pub fn validate_transition(from: EventStatus, to: EventStatus) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!("invalid transition: {from} -> {to}"))
    }
}

/// Whether an administrator may reset this event back to PLANNED.
///
/// Completed events are excluded: their attendance and payroll records
/// make a silent reset unsafe.
pub fn can_reset(from: EventStatus) -> bool {
    matches!(
        from,
        EventStatus::Sent | EventStatus::Skipped | EventStatus::Cancelled
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use EventStatus::*;

    #[test]
    fn planned_to_sent() {
        assert!(can_transition(Planned, Sent));
    }

    #[test]
    fn planned_to_completed_for_ad_hoc() {
        assert!(can_transition(Planned, Completed));
    }

    #[test]
    fn planned_to_cancelled_and_skipped() {
        assert!(can_transition(Planned, Cancelled));
        assert!(can_transition(Planned, Skipped));
    }

    #[test]
    fn sent_to_completed() {
        assert!(can_transition(Sent, Completed));
    }

    #[test]
    fn sent_cannot_be_cancelled() {
        // Once the instructor has been notified, only attendance or an
        // administrative skip closes the event.
        assert!(!can_transition(Sent, Cancelled));
        assert!(!can_transition(Sent, Planned));
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        for status in [Completed, Skipped, Cancelled] {
            assert!(status.is_terminal());
            assert!(valid_transitions(status).is_empty());
        }
    }

    #[test]
    fn validate_transition_reports_codes() {
        let err = validate_transition(Completed, Planned).unwrap_err();
        assert!(err.contains("COMPLETED"));
        assert!(err.contains("PLANNED"));
    }

    #[test]
    fn reset_allowed_except_from_completed_and_planned() {
        assert!(can_reset(Sent));
        assert!(can_reset(Skipped));
        assert!(can_reset(Cancelled));
        assert!(!can_reset(Completed));
        assert!(!can_reset(Planned));
    }

    #[test]
    fn codes_round_trip() {
        for status in [Planned, Sent, Completed, Skipped, Cancelled] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EventStatus::parse("UNKNOWN"), None);
    }
}
