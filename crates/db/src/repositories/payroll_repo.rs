//! Repository for the `payroll_entries` table.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use classtrack_core::types::DbId;

use crate::models::payroll::{PayrollEntry, PayrollListQuery, PAYROLL_APPROVED, PAYROLL_CALCULATED};

const COLUMNS: &str =
    "id, instructor_id, lesson_event_id, amount, status, note, created_at, updated_at";

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Provides persistence operations for payroll entries.
pub struct PayrollRepo;

impl PayrollRepo {
    /// Insert a freshly derived entry in `CALCULATED` status.
    ///
    /// Runs on a connection so the caller can keep it in the same
    /// transaction as the conducted-lesson upsert.
    pub async fn insert_calculated(
        conn: &mut PgConnection,
        instructor_id: DbId,
        lesson_event_id: DbId,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<PayrollEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO payroll_entries (instructor_id, lesson_event_id, amount, status, note) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PayrollEntry>(&query)
            .bind(instructor_id)
            .bind(lesson_event_id)
            .bind(amount)
            .bind(PAYROLL_CALCULATED)
            .bind(note)
            .fetch_one(conn)
            .await
    }

    pub async fn exists_for_event(
        conn: &mut PgConnection,
        lesson_event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM payroll_entries WHERE lesson_event_id = $1)",
        )
        .bind(lesson_event_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PayrollEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payroll_entries WHERE id = $1");
        sqlx::query_as::<_, PayrollEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `CALCULATED` -> `APPROVED`. Returns `None` when the entry does
    /// not exist or is not in `CALCULATED` status.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<PayrollEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE payroll_entries \
             SET status = $2, updated_at = now() \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PayrollEntry>(&query)
            .bind(id)
            .bind(PAYROLL_APPROVED)
            .bind(PAYROLL_CALCULATED)
            .fetch_optional(pool)
            .await
    }

    /// `APPROVED` -> `PAID`. Returns `None` unless the entry is
    /// currently `APPROVED`.
    pub async fn mark_paid(pool: &PgPool, id: DbId) -> Result<Option<PayrollEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE payroll_entries \
             SET status = $2, updated_at = now() \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PayrollEntry>(&query)
            .bind(id)
            .bind(crate::models::payroll::PAYROLL_PAID)
            .bind(PAYROLL_APPROVED)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &PayrollListQuery,
    ) -> Result<Vec<PayrollEntry>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx = 1;
        if params.instructor_id.is_some() {
            conditions.push(format!("instructor_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };
        let query = format!(
            "SELECT {COLUMNS} FROM payroll_entries \
             {where_clause}\
             ORDER BY created_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, PayrollEntry>(&query);
        if let Some(instructor_id) = params.instructor_id {
            q = q.bind(instructor_id);
        }
        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }
}
