use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use classtrack_core::types::{DbId, Timestamp};

/// Payroll entry status codes. An entry is immutable once `PAID`.
pub const PAYROLL_CALCULATED: &str = "CALCULATED";
pub const PAYROLL_APPROVED: &str = "APPROVED";
pub const PAYROLL_PAID: &str = "PAID";

/// A row from the `payroll_entries` table: one payout derived from a
/// completed lesson and the rate in effect on its date.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PayrollEntry {
    pub id: DbId,
    pub instructor_id: DbId,
    pub lesson_event_id: DbId,
    pub amount: Decimal,
    pub status: String,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Query parameters for `GET /payroll-entries`.
#[derive(Debug, Deserialize)]
pub struct PayrollListQuery {
    pub instructor_id: Option<DbId>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
