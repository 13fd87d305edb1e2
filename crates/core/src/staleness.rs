//! Staleness policy for never-sent notifications.
//!
//! Delivery failures are retried indefinitely (they are assumed to be
//! transient), but an event whose deadline is long past without a
//! single successful send is no longer worth reminding anyone about.
//! The cutoff is a deployment policy, not a constant, so it arrives
//! here as a parameter.

use chrono::Duration;

use crate::types::Timestamp;

/// Whether a still-unsent event has aged past the abandonment cutoff.
pub fn is_stale(notify_at: Timestamp, now: Timestamp, stale_after: Duration) -> bool {
    now - notify_at > stale_after
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn fresh_event_is_not_stale() {
        let notify_at = Utc.with_ymd_and_hms(2025, 1, 6, 16, 30, 0).unwrap();
        let now = notify_at + Duration::minutes(10);
        assert!(!is_stale(notify_at, now, Duration::hours(24)));
    }

    #[test]
    fn event_past_cutoff_is_stale() {
        let notify_at = Utc.with_ymd_and_hms(2025, 1, 6, 16, 30, 0).unwrap();
        let now = notify_at + Duration::hours(25);
        assert!(is_stale(notify_at, now, Duration::hours(24)));
    }

    #[test]
    fn cutoff_boundary_is_exclusive() {
        let notify_at = Utc.with_ymd_and_hms(2025, 1, 6, 16, 30, 0).unwrap();
        let now = notify_at + Duration::hours(24);
        assert!(!is_stale(notify_at, now, Duration::hours(24)));
    }
}
