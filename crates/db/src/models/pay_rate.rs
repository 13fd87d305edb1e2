use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use classtrack_core::payrates::RateCandidate;
use classtrack_core::types::{DbId, Timestamp};

/// A row from the `pay_rates` table: an instructor's per-lesson rate
/// over an effective date range. An open-ended range
/// (`effective_to = NULL`) means "still current".
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PayRate {
    pub id: DbId,
    pub instructor_id: DbId,
    pub amount: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub created_at: Timestamp,
}

impl PayRate {
    /// View used by the pure rate-selection logic.
    pub fn as_candidate(&self) -> RateCandidate {
        RateCandidate {
            id: self.id,
            amount: self.amount,
            effective_from: self.effective_from,
            effective_to: self.effective_to,
        }
    }
}

/// DTO for creating a pay rate. Overlap with existing ranges for the
/// same instructor is rejected.
#[derive(Debug, Deserialize)]
pub struct CreatePayRate {
    pub instructor_id: DbId,
    pub amount: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}
