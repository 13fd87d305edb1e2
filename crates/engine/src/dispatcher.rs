//! Notification dispatch.
//!
//! Polls for due PLANNED events and delivers instructor reminders.
//! Each due event is processed in its own short transaction: the claim
//! (`FOR UPDATE SKIP LOCKED`) makes racing dispatcher instances skip
//! past each other, and the outcome update commits with the claim so a
//! concurrent cancel can never interleave.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use classtrack_core::staleness::is_stale;
use classtrack_core::types::{DbId, Timestamp};
use classtrack_db::models::lesson_event::LessonEvent;
use classtrack_db::models::schedule::format_slot;
use classtrack_db::repositories::{ActivityRepo, LessonEventRepo, ScheduleRepo};

use crate::channel::NotificationChannel;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::render::{reminder_text, Reminder};

/// Skip reason recorded when a never-sent event outlives the cutoff.
pub const SKIP_REASON_STALE: &str = "notification window expired";

/// Skip reason recorded when a scheduled event has nobody enrolled.
pub const SKIP_REASON_EMPTY_ROSTER: &str = "no students enrolled";

/// What happened to one claimed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent(DbId),
    Skipped(DbId),
    Failed(DbId),
}

/// Counters from one dispatch cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DispatchReport {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Claims due events and pushes reminders through the channel.
pub struct NotificationDispatcher {
    pool: PgPool,
    channel: Arc<dyn NotificationChannel>,
    config: EngineConfig,
}

impl NotificationDispatcher {
    pub fn new(pool: PgPool, channel: Arc<dyn NotificationChannel>, config: EngineConfig) -> Self {
        Self {
            pool,
            channel,
            config,
        }
    }

    /// Run the dispatch loop until the cancellation token fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.dispatch_interval);
        tracing::info!(
            interval_secs = self.config.dispatch_interval.as_secs(),
            "Notification dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(report) => {
                            if report.sent + report.skipped + report.failed > 0 {
                                tracing::info!(
                                    sent = report.sent,
                                    skipped = report.skipped,
                                    failed = report.failed,
                                    "Dispatch cycle complete",
                                );
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "Dispatch cycle failed"),
                    }
                }
            }
        }
    }

    /// Drain everything currently due, oldest deadline first. Each
    /// event gets exactly one attempt per cycle: a failed send leaves
    /// it PLANNED and due, so without the attempted-id exclusion the
    /// loop would spin on the same row until the channel recovers.
    /// Retries happen on the next poll instead.
    pub async fn run_once(&self, now: Timestamp) -> Result<DispatchReport, EngineError> {
        let mut report = DispatchReport::default();
        let mut attempted: Vec<DbId> = Vec::new();
        while let Some(outcome) = self.dispatch_next(now, &attempted).await? {
            match outcome {
                DispatchOutcome::Sent(id) => {
                    report.sent += 1;
                    attempted.push(id);
                }
                DispatchOutcome::Skipped(id) => {
                    report.skipped += 1;
                    attempted.push(id);
                }
                DispatchOutcome::Failed(id) => {
                    report.failed += 1;
                    attempted.push(id);
                }
            }
        }
        Ok(report)
    }

    /// Claim and process at most one due event outside `exclude`.
    /// Returns `None` when nothing is due (or every due row is locked
    /// by another worker).
    pub async fn dispatch_next(
        &self,
        now: Timestamp,
        exclude: &[DbId],
    ) -> Result<Option<DispatchOutcome>, EngineError> {
        let mut tx = self.pool.begin().await?;

        let Some(event) = LessonEventRepo::lock_next_due(&mut *tx, now, exclude).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Deadline long past without a single successful send: give up
        // rather than remind someone about a lesson that already happened.
        if is_stale(event.notify_at, now, self.config.stale_after) {
            LessonEventRepo::mark_skipped(&mut *tx, event.id, SKIP_REASON_STALE).await?;
            tx.commit().await?;
            tracing::warn!(event_id = event.id, "Stale event skipped");
            return Ok(Some(DispatchOutcome::Skipped(event.id)));
        }

        // The roster is read at dispatch time, inside the claim, so
        // late enrollment changes are reflected in the reminder.
        let roster = match event.schedule_id {
            Some(schedule_id) => ScheduleRepo::roster(&mut *tx, schedule_id).await?,
            None => Vec::new(),
        };

        if event.schedule_id.is_some() && roster.is_empty() {
            LessonEventRepo::mark_skipped(&mut *tx, event.id, SKIP_REASON_EMPTY_ROSTER).await?;
            tx.commit().await?;
            tracing::info!(event_id = event.id, "Event with empty roster skipped");
            return Ok(Some(DispatchOutcome::Skipped(event.id)));
        }

        let text = render_for(&mut *tx, &event, &roster).await?;

        // lock_next_due filters on instructor_chat_id IS NOT NULL.
        let Some(chat_id) = event.instructor_chat_id else {
            tx.rollback().await?;
            return Err(EngineError::Channel(
                "claimed event lost its chat id".into(),
            ));
        };

        let outcome =
            match tokio::time::timeout(self.config.send_timeout, self.channel.send(chat_id, &text))
                .await
            {
                Ok(Ok(())) => {
                    LessonEventRepo::mark_sent(&mut *tx, event.id, now).await?;
                    tracing::info!(event_id = event.id, chat_id, "Reminder sent");
                    DispatchOutcome::Sent(event.id)
                }
                Ok(Err(e)) => {
                    LessonEventRepo::record_send_failure(&mut *tx, event.id, &e.to_string()).await?;
                    tracing::warn!(event_id = event.id, error = %e, "Reminder delivery failed");
                    DispatchOutcome::Failed(event.id)
                }
                Err(_) => {
                    let reason = format!(
                        "send timed out after {}s",
                        self.config.send_timeout.as_secs()
                    );
                    LessonEventRepo::record_send_failure(&mut *tx, event.id, &reason).await?;
                    tracing::warn!(event_id = event.id, "Reminder delivery timed out");
                    DispatchOutcome::Failed(event.id)
                }
            };

        tx.commit().await?;
        Ok(Some(outcome))
    }
}

/// Render the reminder on the claiming transaction's connection so a
/// saturated pool cannot stall a dispatch mid-claim.
async fn render_for(
    conn: &mut sqlx::PgConnection,
    event: &LessonEvent,
    roster: &[classtrack_db::models::enrollment::RosterStudent],
) -> Result<String, EngineError> {
    let activity_name = match event.activity_id {
        Some(activity_id) => ActivityRepo::find_by_id(&mut *conn, activity_id)
            .await?
            .map(|a| a.name),
        None => None,
    };

    let slot = match event.schedule_id {
        Some(schedule_id) => ScheduleRepo::find_by_id(&mut *conn, schedule_id)
            .await?
            .map(|s| format_slot(s.start_time, s.end_time)),
        None => None,
    };

    Ok(reminder_text(&Reminder {
        activity_name: activity_name.as_deref(),
        date: event.date,
        slot,
        roster,
    }))
}
