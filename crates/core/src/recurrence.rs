//! Weekly recurrence resolution.
//!
//! Pure calendar math: given a schedule's ISO weekday and a date
//! window, compute the concrete dates the schedule occurs on, and turn
//! a local date + start time into the UTC instants the engine stores.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::types::Timestamp;

/// All dates in `[from, to]` falling on `weekday` (ISO: 1 = Monday ..
/// 7 = Sunday), in ascending order.
///
/// An inverted window (`from > to`) or a weekday outside 1–7 yields an
/// empty list, not an error.
pub fn resolve_dates(weekday: u8, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    if from > to || !(1..=7).contains(&weekday) {
        return Vec::new();
    }

    let ahead = (7 + i64::from(weekday) - i64::from(from.weekday().number_from_monday())) % 7;
    let mut date = from + Duration::days(ahead);

    let mut dates = Vec::new();
    while date <= to {
        dates.push(date);
        date += Duration::days(7);
    }
    dates
}

/// Interpret `date` + `time` as wall-clock in the given fixed-offset
/// timezone and return the corresponding UTC instant.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: FixedOffset) -> Timestamp {
    let naive_utc = date.and_time(time) - tz;
    Utc.from_utc_datetime(&naive_utc)
}

/// Notification deadline: lesson start minus the configured lead time.
pub fn notify_deadline(start_at: Timestamp, lead_time: Duration) -> Timestamp {
    start_at - lead_time
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn two_mondays_in_a_fourteen_day_window() {
        // 2025-01-06 is a Monday.
        let dates = resolve_dates(1, date(2025, 1, 6), date(2025, 1, 19));
        assert_eq!(dates, vec![date(2025, 1, 6), date(2025, 1, 13)]);
    }

    #[test]
    fn window_start_counts_when_it_matches() {
        let dates = resolve_dates(3, date(2025, 1, 8), date(2025, 1, 8));
        assert_eq!(dates, vec![date(2025, 1, 8)]); // a Wednesday
    }

    #[test]
    fn inverted_window_is_empty() {
        assert!(resolve_dates(1, date(2025, 1, 19), date(2025, 1, 6)).is_empty());
    }

    #[test]
    fn weekday_outside_domain_is_empty() {
        assert!(resolve_dates(0, date(2025, 1, 6), date(2025, 1, 19)).is_empty());
        assert!(resolve_dates(8, date(2025, 1, 6), date(2025, 1, 19)).is_empty());
    }

    #[test]
    fn sunday_resolves() {
        let dates = resolve_dates(7, date(2025, 1, 6), date(2025, 1, 12));
        assert_eq!(dates, vec![date(2025, 1, 12)]);
    }

    #[test]
    fn local_seventeen_hundred_plus_two_becomes_fifteen_utc() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = local_to_utc(date(2025, 1, 6), NaiveTime::from_hms_opt(17, 0, 0).unwrap(), tz);
        assert_eq!(start.to_rfc3339(), "2025-01-06T15:00:00+00:00");
    }

    #[test]
    fn notify_deadline_is_start_minus_lead() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = local_to_utc(date(2025, 1, 6), NaiveTime::from_hms_opt(17, 0, 0).unwrap(), tz);
        let deadline = notify_deadline(start, Duration::minutes(30));
        assert_eq!(deadline.to_rfc3339(), "2025-01-06T16:30:00+00:00");
    }
}
