//! Occurrence generation.
//!
//! Materializes dated PLANNED lesson events from active weekly
//! schedules over a rolling window. Runs are idempotent: the partial
//! unique index on (schedule_id, date) turns a re-run into no-ops for
//! dates that already have an event, whatever its current status.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use classtrack_core::recurrence::{local_to_utc, notify_deadline, resolve_dates};
use classtrack_core::types::Timestamp;
use classtrack_db::repositories::{InstructorRepo, LessonEventRepo, ScheduleRepo};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Counters from one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct GenerationReport {
    /// Active schedules visited.
    pub schedules: usize,
    /// New events created.
    pub created: u64,
    /// (schedule, date) pairs that already had an event.
    pub already_existed: u64,
}

/// Materializes schedule occurrences on a fixed interval.
pub struct OccurrenceGenerator {
    pool: PgPool,
    config: EngineConfig,
}

impl OccurrenceGenerator {
    pub fn new(pool: PgPool, config: EngineConfig) -> Self {
        Self { pool, config }
    }

    /// Run the generation loop until the cancellation token fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.generation_interval);
        tracing::info!(
            window_days = self.config.generation_window_days,
            interval_secs = self.config.generation_interval.as_secs(),
            "Occurrence generator started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Occurrence generator shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(report) => {
                            if report.created > 0 {
                                tracing::info!(
                                    schedules = report.schedules,
                                    created = report.created,
                                    "Generation cycle complete",
                                );
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "Generation cycle failed"),
                    }
                }
            }
        }
    }

    /// One generation cycle over all active schedules.
    ///
    /// Occurrences whose start is already in the past at generation
    /// time are not created; a schedule activated mid-day should not
    /// spawn an event for a lesson that is already over.
    pub async fn run_once(&self, now: Timestamp) -> Result<GenerationReport, EngineError> {
        let today = now.with_timezone(&self.config.tz).date_naive();
        let window_end = today + Duration::days(i64::from(self.config.generation_window_days));

        let schedules = ScheduleRepo::list_active(&self.pool).await?;
        let mut report = GenerationReport {
            schedules: schedules.len(),
            ..GenerationReport::default()
        };

        for schedule in &schedules {
            let instructor = InstructorRepo::find_by_id(&self.pool, schedule.instructor_id).await?;
            let chat_id = instructor.and_then(|i| i.chat_id);

            // weekday is CHECK-constrained to 1..=7, so the cast is lossless.
            for date in resolve_dates(schedule.weekday as u8, today, window_end) {
                let start_at = local_to_utc(date, schedule.start_time, self.config.tz);
                if start_at <= now {
                    continue;
                }
                let notify_at = notify_deadline(start_at, self.config.lead_time);

                let inserted = LessonEventRepo::insert_planned(
                    &self.pool,
                    schedule.id,
                    schedule.activity_id,
                    schedule.instructor_id,
                    chat_id,
                    date,
                    start_at,
                    notify_at,
                )
                .await?;

                match inserted {
                    Some(event) => {
                        report.created += 1;
                        tracing::debug!(
                            event_id = event.id,
                            schedule_id = schedule.id,
                            date = %date,
                            "Occurrence created",
                        );
                    }
                    None => report.already_existed += 1,
                }
            }
        }

        Ok(report)
    }
}
