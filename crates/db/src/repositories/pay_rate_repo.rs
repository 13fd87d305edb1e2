//! Repository for the `pay_rates` table.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use classtrack_core::types::DbId;

use crate::models::pay_rate::{CreatePayRate, PayRate};

const COLUMNS: &str = "id, instructor_id, amount, effective_from, effective_to, created_at";

/// Provides persistence operations for instructor pay rates.
pub struct PayRateRepo;

impl PayRateRepo {
    /// Create a rate. Overlap validation happens in the handler before
    /// this call, against [`PayRateRepo::list_for_instructor`].
    pub async fn create(pool: &PgPool, input: &CreatePayRate) -> Result<PayRate, sqlx::Error> {
        let query = format!(
            "INSERT INTO pay_rates (instructor_id, amount, effective_from, effective_to) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PayRate>(&query)
            .bind(input.instructor_id)
            .bind(input.amount)
            .bind(input.effective_from)
            .bind(input.effective_to)
            .fetch_one(pool)
            .await
    }

    /// All rates for an instructor, newest effective range first.
    pub async fn list_for_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<PayRate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pay_rates \
             WHERE instructor_id = $1 \
             ORDER BY effective_from DESC"
        );
        sqlx::query_as::<_, PayRate>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }

    /// The rate in effect on a given date. Latest `effective_from`
    /// wins, which doubles as the defensive tie-break should ranges
    /// improperly overlap.
    pub async fn find_effective(
        conn: &mut PgConnection,
        instructor_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<PayRate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pay_rates \
             WHERE instructor_id = $1 \
               AND effective_from <= $2 \
               AND (effective_to IS NULL OR effective_to >= $2) \
             ORDER BY effective_from DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PayRate>(&query)
            .bind(instructor_id)
            .bind(date)
            .fetch_optional(conn)
            .await
    }
}
