//! Integration tests for schedule mutation propagation.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use sqlx::PgPool;

use classtrack_core::lifecycle::EventStatus;
use classtrack_core::types::{DbId, Timestamp};
use classtrack_core::CoreError;
use classtrack_db::models::lesson_event::{EventListQuery, LessonEvent};
use classtrack_db::repositories::{LessonEventRepo, ScheduleRepo};
use classtrack_engine::reassignment;
use classtrack_engine::EngineError;

async fn seed_planned_event(
    pool: &PgPool,
    schedule_id: DbId,
    instructor_id: DbId,
    chat_id: Option<i64>,
    start_at: Timestamp,
) -> LessonEvent {
    LessonEventRepo::insert_planned(
        pool,
        schedule_id,
        None,
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

async fn events_for(pool: &PgPool, schedule_id: DbId) -> Vec<LessonEvent> {
    LessonEventRepo::list(
        pool,
        &EventListQuery {
            status: None,
            schedule_id: Some(schedule_id),
            instructor_id: None,
            date_from: None,
            date_to: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reassignment_moves_future_planned_events(pool: PgPool) {
    let old = common::seed_instructor(&pool, "Mira Voss", Some(1)).await;
    let new = common::seed_instructor(&pool, "Jon Petric", Some(2)).await;
    let schedule = common::seed_schedule(
        &pool,
        old.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;

    let now = common::monday_morning();
    let today = now.date_naive();

    let future = seed_planned_event(&pool, schedule.id, old.id, Some(1), now + Duration::days(7)).await;
    let sent = seed_planned_event(&pool, schedule.id, old.id, Some(1), now + Duration::days(14)).await;
    // Mark one future event SENT; it must keep its historical instructor.
    {
        let mut conn = pool.acquire().await.unwrap();
        LessonEventRepo::mark_sent(&mut conn, sent.id, now).await.unwrap();
    }

    let result = reassignment::reassign_instructor(&pool, schedule.id, new.id, today)
        .await
        .unwrap();
    assert_eq!(result.schedule.instructor_id, new.id);
    assert_eq!(result.events_affected, 1);

    let schedule_after = ScheduleRepo::find_by_id(&pool, schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(schedule_after.instructor_id, new.id);

    let future_after = LessonEventRepo::find_by_id(&pool, future.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(future_after.instructor_id, new.id);
    assert_eq!(future_after.instructor_chat_id, Some(2));
    assert_eq!(future_after.status(), Some(EventStatus::Planned));

    let sent_after = LessonEventRepo::find_by_id(&pool, sent.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sent_after.instructor_id, old.id);
    assert_eq!(sent_after.status(), Some(EventStatus::Sent));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reassignment_to_inactive_instructor_is_rejected(pool: PgPool) {
    let old = common::seed_instructor(&pool, "Mira Voss", Some(1)).await;
    let new = common::seed_instructor(&pool, "Jon Petric", Some(2)).await;
    sqlx::query("UPDATE instructors SET is_active = FALSE WHERE id = $1")
        .bind(new.id)
        .execute(&pool)
        .await
        .unwrap();
    let schedule = common::seed_schedule(
        &pool,
        old.id,
        None,
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;

    let err = reassignment::reassign_instructor(
        &pool,
        schedule.id,
        new.id,
        common::monday_morning().date_naive(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_cancels_future_planned_only(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(1)).await;
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
    let today = now.date_naive();

    let future = seed_planned_event(
        &pool,
        schedule.id,
        instructor.id,
        Some(1),
        now + Duration::days(7),
    )
    .await;
    let past = seed_planned_event(
        &pool,
        schedule.id,
        instructor.id,
        Some(1),
        now - Duration::days(7),
    )
    .await;

    let result = reassignment::deactivate_schedule(&pool, schedule.id, today)
        .await
        .unwrap();
    assert!(!result.schedule.is_active);
    assert_eq!(result.events_affected, 1);

    let future_after = LessonEventRepo::find_by_id(&pool, future.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(future_after.status(), Some(EventStatus::Cancelled));

    let past_after = LessonEventRepo::find_by_id(&pool, past.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(past_after.status(), Some(EventStatus::Planned));

    // Double deactivation is a conflict.
    let err = reassignment::deactivate_schedule(&pool, schedule.id, today)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reactivation_restores_cancelled_future_events(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(1)).await;
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
    let today = now.date_naive();

    seed_planned_event(
        &pool,
        schedule.id,
        instructor.id,
        Some(1),
        now + Duration::days(7),
    )
    .await;

    reassignment::deactivate_schedule(&pool, schedule.id, today)
        .await
        .unwrap();
    let result = reassignment::reactivate_schedule(&pool, schedule.id, today)
        .await
        .unwrap();
    assert!(result.schedule.is_active);
    assert_eq!(result.events_affected, 1);

    let events = events_for(&pool, schedule.id).await;
    assert!(events
        .iter()
        .all(|e| e.status() == Some(EventStatus::Planned)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_schedule_is_not_found(pool: PgPool) {
    let err = reassignment::deactivate_schedule(
        &pool,
        999_999,
        common::monday_morning().date_naive(),
    )
    .await
    .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { .. }));
}
