//! Payroll derivation.
//!
//! A completed lesson earns exactly one payroll entry, and only when
//! somebody showed up. Derivation runs inside the attendance
//! recorder's transaction so the summary and the entry commit
//! together.

use sqlx::PgConnection;

use classtrack_db::models::conducted_lesson::ConductedLesson;
use classtrack_db::models::lesson_event::LessonEvent;
use classtrack_db::models::payroll::PayrollEntry;
use classtrack_db::repositories::{ConductedLessonRepo, PayRateRepo, PayrollRepo};

use crate::error::EngineError;

/// Why no entry was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayrollSkip {
    /// Nobody was present; the lesson earns nothing.
    NobodyPresent,
    /// An entry already exists for this event.
    AlreadyDerived,
    /// No pay rate covers the lesson date. The lesson stays on the
    /// unpaid review list until a rate is backfilled.
    NoEffectiveRate,
}

/// Derives payroll entries from conducted-lesson summaries.
pub struct PayrollDeriver;

impl PayrollDeriver {
    /// Derive the payroll entry for a conducted lesson, if it is due
    /// one. Must run in the same transaction that wrote the summary.
    pub async fn derive(
        conn: &mut PgConnection,
        event: &LessonEvent,
        lesson: &ConductedLesson,
    ) -> Result<Result<PayrollEntry, PayrollSkip>, EngineError> {
        if lesson.present_students == 0 {
            return Ok(Err(PayrollSkip::NobodyPresent));
        }
        if lesson.is_payroll_calculated
            || PayrollRepo::exists_for_event(conn, event.id).await?
        {
            return Ok(Err(PayrollSkip::AlreadyDerived));
        }

        let Some(rate) = PayRateRepo::find_effective(conn, event.instructor_id, event.date).await?
        else {
            tracing::warn!(
                event_id = event.id,
                instructor_id = event.instructor_id,
                date = %event.date,
                "No pay rate in effect; lesson left on the unpaid list",
            );
            return Ok(Err(PayrollSkip::NoEffectiveRate));
        };

        let entry = PayrollRepo::insert_calculated(
            conn,
            event.instructor_id,
            event.id,
            rate.amount,
            None,
        )
        .await?;
        ConductedLessonRepo::mark_payroll_calculated(conn, lesson.id).await?;

        tracing::info!(
            event_id = event.id,
            entry_id = entry.id,
            amount = %entry.amount,
            "Payroll entry derived",
        );
        Ok(Ok(entry))
    }
}
