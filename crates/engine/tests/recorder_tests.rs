//! Integration tests for attendance recording and payroll derivation.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use rust_decimal::Decimal;
use sqlx::PgPool;

use classtrack_core::lifecycle::EventStatus;
use classtrack_core::types::{DbId, Timestamp};
use classtrack_core::CoreError;
use classtrack_db::models::attendance::RecordAttendance;
use classtrack_db::models::conducted_lesson::ConductedLessonQuery;
use classtrack_db::models::lesson_event::LessonEvent;
use classtrack_db::models::payroll::{PayrollListQuery, PAYROLL_CALCULATED};
use classtrack_db::repositories::{
    AttendanceRepo, ConductedLessonRepo, LessonEventRepo, PayrollRepo,
};
use classtrack_engine::recorder::AttendanceRecorder;
use classtrack_engine::EngineError;

struct Fixture {
    event: LessonEvent,
    instructor_id: DbId,
    students: Vec<DbId>,
    now: Timestamp,
}

/// Instructor + activity + schedule with two enrolled students and one
/// PLANNED event for today.
async fn fixture(pool: &PgPool) -> Fixture {
    let instructor = common::seed_instructor(pool, "Mira Voss", Some(42)).await;
    let activity = common::seed_activity(pool, "Choir", Some(45)).await;
    let schedule = common::seed_schedule(
        pool,
        instructor.id,
        Some(activity.id),
        1,
        common::time(17, 0),
        common::time(18, 0),
    )
    .await;
    let a = common::seed_student(pool, "Alice Ahn").await;
    let b = common::seed_student(pool, "Bram Okafor").await;
    common::enroll(pool, schedule.id, a.id).await;
    common::enroll(pool, schedule.id, b.id).await;

    let now = common::monday_morning();
    let start_at = now + Duration::hours(9);
    let event = LessonEventRepo::insert_planned(
        pool,
        schedule.id,
        Some(activity.id),
        instructor.id,
        Some(42),
        start_at.date_naive(),
        start_at,
        start_at - Duration::minutes(30),
    )
    .await
    .unwrap()
    .unwrap();

    Fixture {
        event,
        instructor_id: instructor.id,
        students: vec![a.id, b.id],
        now,
    }
}

fn submission(present: &[DbId]) -> RecordAttendance {
    RecordAttendance {
        present_student_ids: present.to_vec(),
        marked_by: Some(42),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recording_completes_event_and_derives_payroll(pool: PgPool) {
    let f = fixture(&pool).await;
    common::seed_rate(&pool, f.instructor_id, 600).await;

    let recorder = AttendanceRecorder::new(pool.clone());
    let lesson = recorder
        .record(f.event.id, &submission(&f.students[..1]), f.now)
        .await
        .unwrap();

    assert_eq!(lesson.total_students, 2);
    assert_eq!(lesson.present_students, 1);
    assert_eq!(lesson.absent_students, 1);
    assert_eq!(lesson.duration_minutes, Some(45));
    assert!(lesson.is_payroll_calculated);

    let event = LessonEventRepo::find_by_id(&pool, f.event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.status(), Some(EventStatus::Completed));
    assert!(event.completed_at.is_some());

    let mut conn = pool.acquire().await.unwrap();
    let marks = AttendanceRepo::list_for_event(&mut conn, f.event.id)
        .await
        .unwrap();
    assert_eq!(marks.len(), 2);
    assert!(marks.iter().any(|m| m.is_present()));
    assert!(marks.iter().any(|m| !m.is_present()));

    let entries = PayrollRepo::list(
        &pool,
        &PayrollListQuery {
            instructor_id: Some(f.instructor_id),
            status: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, Decimal::from(600));
    assert_eq!(entries[0].status, PAYROLL_CALCULATED);
    assert_eq!(entries[0].lesson_event_id, f.event.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resubmission_overwrites_totals_without_second_entry(pool: PgPool) {
    let f = fixture(&pool).await;
    common::seed_rate(&pool, f.instructor_id, 600).await;

    let recorder = AttendanceRecorder::new(pool.clone());
    recorder
        .record(f.event.id, &submission(&f.students[..1]), f.now)
        .await
        .unwrap();
    let corrected = recorder
        .record(f.event.id, &submission(&f.students), f.now)
        .await
        .unwrap();

    assert_eq!(corrected.present_students, 2);
    assert_eq!(corrected.absent_students, 0);

    let lessons = ConductedLessonRepo::list(
        &pool,
        &ConductedLessonQuery {
            unpaid: false,
            instructor_id: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(lessons.len(), 1);

    let entries = PayrollRepo::list(
        &pool,
        &PayrollListQuery {
            instructor_id: Some(f.instructor_id),
            status: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(entries.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn nobody_present_earns_no_payroll(pool: PgPool) {
    let f = fixture(&pool).await;
    common::seed_rate(&pool, f.instructor_id, 600).await;

    let recorder = AttendanceRecorder::new(pool.clone());
    let lesson = recorder
        .record(f.event.id, &submission(&[]), f.now)
        .await
        .unwrap();

    assert_eq!(lesson.present_students, 0);
    assert!(!lesson.is_payroll_calculated);

    let entries = PayrollRepo::list(
        &pool,
        &PayrollListQuery {
            instructor_id: None,
            status: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert!(entries.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_rate_leaves_lesson_on_unpaid_list(pool: PgPool) {
    let f = fixture(&pool).await;
    // No pay rate seeded.

    let recorder = AttendanceRecorder::new(pool.clone());
    let lesson = recorder
        .record(f.event.id, &submission(&f.students), f.now)
        .await
        .unwrap();
    assert!(!lesson.is_payroll_calculated);

    let unpaid = ConductedLessonRepo::list(
        &pool,
        &ConductedLessonQuery {
            unpaid: true,
            instructor_id: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(unpaid.len(), 1);
    assert_eq!(unpaid[0].lesson_event_id, f.event.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backfilled_rate_pays_on_resubmission(pool: PgPool) {
    let f = fixture(&pool).await;

    let recorder = AttendanceRecorder::new(pool.clone());
    recorder
        .record(f.event.id, &submission(&f.students), f.now)
        .await
        .unwrap();

    common::seed_rate(&pool, f.instructor_id, 750).await;
    let lesson = recorder
        .record(f.event.id, &submission(&f.students), f.now)
        .await
        .unwrap();
    assert!(lesson.is_payroll_calculated);

    let entries = PayrollRepo::list(
        &pool,
        &PayrollListQuery {
            instructor_id: Some(f.instructor_id),
            status: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, Decimal::from(750));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_outside_roster_are_ignored(pool: PgPool) {
    let f = fixture(&pool).await;
    let outsider = common::seed_student(&pool, "Zara Lind").await;

    let recorder = AttendanceRecorder::new(pool.clone());
    let lesson = recorder
        .record(f.event.id, &submission(&[f.students[0], outsider.id]), f.now)
        .await
        .unwrap();

    assert_eq!(lesson.total_students, 2);
    assert_eq!(lesson.present_students, 1);

    let mut conn = pool.acquire().await.unwrap();
    let marks = AttendanceRepo::list_for_event(&mut conn, f.event.id)
        .await
        .unwrap();
    assert!(marks.iter().all(|m| m.student_id != outsider.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancelled_event_rejects_attendance(pool: PgPool) {
    let f = fixture(&pool).await;
    assert!(LessonEventRepo::cancel(&pool, f.event.id).await.unwrap());

    let recorder = AttendanceRecorder::new(pool.clone());
    let err = recorder
        .record(f.event.id, &submission(&f.students), f.now)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::InvalidTransition(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_event_is_not_found(pool: PgPool) {
    let recorder = AttendanceRecorder::new(pool.clone());
    let err = recorder
        .record(999_999, &submission(&[]), common::monday_morning())
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ad_hoc_lesson_counts_submitted_students_as_roster(pool: PgPool) {
    let instructor = common::seed_instructor(&pool, "Mira Voss", Some(42)).await;
    common::seed_rate(&pool, instructor.id, 500).await;
    let a = common::seed_student(&pool, "Alice Ahn").await;
    let b = common::seed_student(&pool, "Bram Okafor").await;

    let now = common::monday_morning();
    let start_at = now + Duration::hours(9);
    let event = LessonEventRepo::insert_ad_hoc(
        &pool,
        &classtrack_db::models::lesson_event::CreateAdHocLesson {
            instructor_id: instructor.id,
            activity_id: None,
            date: start_at.date_naive(),
            start_at,
            idempotency_key: "adhoc-1".into(),
        },
        Some(42),
        start_at - Duration::minutes(30),
    )
    .await
    .unwrap();

    let recorder = AttendanceRecorder::new(pool.clone());
    let lesson = recorder
        .record(event.id, &submission(&[a.id, b.id]), now)
        .await
        .unwrap();

    assert_eq!(lesson.total_students, 2);
    assert_eq!(lesson.present_students, 2);
    assert!(lesson.is_payroll_calculated);
}
