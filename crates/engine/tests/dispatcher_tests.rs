//! Integration tests for notification dispatch.

mod common;

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use classtrack_core::lifecycle::EventStatus;
use classtrack_core::types::{DbId, Timestamp};
use classtrack_db::models::lesson_event::LessonEvent;
use classtrack_db::repositories::LessonEventRepo;
use classtrack_engine::dispatcher::{
    NotificationDispatcher, SKIP_REASON_EMPTY_ROSTER, SKIP_REASON_STALE,
};

use common::RecordingChannel;

/// Insert a PLANNED event for the schedule whose deadline is already
/// due at `now` (lesson starts in ten minutes).
async fn seed_due_event(
    pool: &PgPool,
    schedule_id: DbId,
    activity_id: Option<DbId>,
    instructor_id: DbId,
    chat_id: Option<i64>,
    now: Timestamp,
) -> LessonEvent {
    let start_at = now + Duration::minutes(10);
    LessonEventRepo::insert_planned(
        pool,
        schedule_id,
        activity_id,
        instructor_id,
        chat_id,
        start_at.date_naive(),
        start_at,
        start_at - Duration::minutes(30),
    )
    .await
    .unwrap()
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn due_event_is_sent_and_transitions(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let activity = common::seed_activity(&pool, "Robotics", Some(90)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        Some(activity.id),
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;
    let student = common::seed_student(&pool, "Alice Ahn").await;
    common::enroll(&pool, schedule.id, student.id).await;

    let now = common::monday_morning();
    let event = seed_due_event(
        &pool,
        schedule.id,
        Some(activity.id),
        instructor.id,
        Some(42),
        now,
    )
    .await;

    let channel = Arc::new(RecordingChannel::default());
    let dispatcher =
        NotificationDispatcher::new(pool.clone(), channel.clone(), common::test_config());
    let report = dispatcher.run_once(now).await.unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.skipped, 0);

    let sent = channel.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 42);
    assert!(sent[0].1.contains("Robotics"));
    assert!(sent[0].1.contains("Alice Ahn"));
    drop(sent);

    let after = LessonEventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status(), Some(EventStatus::Sent));
    assert!(after.sent_at.is_some());
    assert_eq!(after.send_attempts, 1);
    assert!(after.last_error.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_roster_is_skipped_with_reason(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;

    let now = common::monday_morning();
    let event = seed_due_event(&pool, schedule.id, None, instructor.id, Some(42), now).await;

    let channel = Arc::new(RecordingChannel::default());
    let dispatcher =
        NotificationDispatcher::new(pool.clone(), channel.clone(), common::test_config());
    let report = dispatcher.run_once(now).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert!(channel.sent.lock().unwrap().is_empty());

    let after = LessonEventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status(), Some(EventStatus::Skipped));
    assert_eq!(after.last_error.as_deref(), Some(SKIP_REASON_EMPTY_ROSTER));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_event_is_abandoned_not_sent(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;
    let student = common::seed_student(&pool, "Alice Ahn").await;
    common::enroll(&pool, schedule.id, student.id).await;

    let now = common::monday_morning();
    // Deadline 25 hours ago: past the 24-hour cutoff.
    let start_at = now - Duration::hours(24) - Duration::minutes(30);
    let event = LessonEventRepo::insert_planned(
        &pool,
        schedule.id,
        None,
        instructor.id,
        Some(42),
        start_at.date_naive(),
        start_at,
        now - Duration::hours(25),
    )
    .await
    .unwrap()
    .unwrap();

    let channel = Arc::new(RecordingChannel::default());
    let dispatcher =
        NotificationDispatcher::new(pool.clone(), channel.clone(), common::test_config());
    let report = dispatcher.run_once(now).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert!(channel.sent.lock().unwrap().is_empty());

    let after = LessonEventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status(), Some(EventStatus::Skipped));
    assert_eq!(after.last_error.as_deref(), Some(SKIP_REASON_STALE));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_delivery_stays_planned_for_retry(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;
    let student = common::seed_student(&pool, "Alice Ahn").await;
    common::enroll(&pool, schedule.id, student.id).await;

    let now = common::monday_morning();
    let event = seed_due_event(&pool, schedule.id, None, instructor.id, Some(42), now).await;

    let dispatcher = NotificationDispatcher::new(
        pool.clone(),
        Arc::new(common::FailingChannel),
        common::test_config(),
    );
    let report = dispatcher.run_once(now).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);

    let after = LessonEventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status(), Some(EventStatus::Planned));
    assert_eq!(after.send_attempts, 1);
    assert!(after.last_error.as_deref().unwrap().contains("outage"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failing_channel_gets_one_attempt_per_event_per_cycle(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;
    let other = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        2,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;
    let student = common::seed_student(&pool, "Alice Ahn").await;
    common::enroll(&pool, schedule.id, student.id).await;
    common::enroll(&pool, other.id, student.id).await;

    let now = common::monday_morning();
    let first = seed_due_event(&pool, schedule.id, None, instructor.id, Some(42), now).await;
    let second = seed_due_event(&pool, other.id, None, instructor.id, Some(42), now).await;

    let dispatcher = NotificationDispatcher::new(
        pool.clone(),
        Arc::new(common::FailingChannel),
        common::test_config(),
    );
    // Failed events stay PLANNED and due; the cycle must still visit
    // each exactly once and return rather than spin on the first.
    let report = tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher.run_once(now))
        .await
        .expect("dispatch cycle did not terminate")
        .unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(report.sent, 0);

    for id in [first.id, second.id] {
        let after = LessonEventRepo::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(after.status(), Some(EventStatus::Planned));
        assert_eq!(after.send_attempts, 1);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_claimers_are_mutually_exclusive(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;

    let now = common::monday_morning();
    let event = seed_due_event(&pool, schedule.id, None, instructor.id, Some(42), now).await;

    let mut tx1 = pool.begin().await.unwrap();
    let first = LessonEventRepo::lock_next_due(&mut tx1, now, &[])
        .await
        .unwrap()
        .expect("first claimer should win the row");
    assert_eq!(first.id, event.id);

    // Second claimer races while the row is locked: SKIP LOCKED makes
    // it see nothing rather than block or double-claim.
    let mut tx2 = pool.begin().await.unwrap();
    let second = LessonEventRepo::lock_next_due(&mut tx2, now, &[])
        .await
        .unwrap();
    assert!(second.is_none());
    tx2.rollback().await.unwrap();

    LessonEventRepo::mark_sent(&mut tx1, first.id, now).await.unwrap();
    tx1.commit().await.unwrap();

    let after = LessonEventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status(), Some(EventStatus::Sent));
    assert_eq!(after.send_attempts, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn events_without_chat_id_are_left_alone(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", None).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;

    let now = common::monday_morning();
    seed_due_event(&pool, schedule.id, None, instructor.id, None, now).await;

    let channel = Arc::new(RecordingChannel::default());
    let dispatcher =
        NotificationDispatcher::new(pool.clone(), channel, common::test_config());
    let report = dispatcher.run_once(now).await.unwrap();

    assert_eq!(report.sent + report.skipped + report.failed, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn future_deadline_is_not_dispatched_early(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    let schedule = common::seed_schedule(
        &pool,
        instructor.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;

    let now = common::monday_morning();
    let start_at = now + Duration::hours(9);
    LessonEventRepo::insert_planned(
        &pool,
        schedule.id,
        None,
        instructor.id,
        Some(42),
        start_at.date_naive(),
        start_at,
        start_at - Duration::minutes(30),
    )
    .await
    .unwrap()
    .unwrap();

    let channel = Arc::new(RecordingChannel::default());
    let dispatcher =
        NotificationDispatcher::new(pool.clone(), channel, common::test_config());
    let report = dispatcher.run_once(now).await.unwrap();

    assert_eq!(report.sent + report.skipped + report.failed, 0);
}
