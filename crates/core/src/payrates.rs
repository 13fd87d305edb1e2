//! Effective pay-rate selection.
//!
//! Rates carry an effective date range with an open-ended `to` meaning
//! "still current". Ranges for one instructor must not overlap; the
//! selection still breaks ties deterministically in case bad data got
//! past validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::DbId;

/// A pay rate candidate, decoupled from the database row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCandidate {
    pub id: DbId,
    pub amount: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

impl RateCandidate {
    /// Whether this rate covers the given lesson date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| to >= date)
    }
}

/// Pick the rate in effect on `date`: among covering ranges, the latest
/// `effective_from` wins. Returns `None` when no range covers the date.
pub fn effective_rate(candidates: &[RateCandidate], date: NaiveDate) -> Option<&RateCandidate> {
    candidates
        .iter()
        .filter(|r| r.covers(date))
        .max_by_key(|r| r.effective_from)
}

/// Whether a proposed range overlaps any existing range.
///
/// Two ranges overlap when each starts before the other ends; an open
/// end extends to infinity.
pub fn overlaps_existing(
    existing: &[RateCandidate],
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> bool {
    existing.iter().any(|r| {
        let starts_before_r_ends = r.effective_to.is_none_or(|r_to| from <= r_to);
        let r_starts_before_ends = to.is_none_or(|new_to| r.effective_from <= new_to);
        starts_before_r_ends && r_starts_before_ends
    })
}
