//! Shared fixtures for engine integration tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveTime, TimeZone, Utc};
use sqlx::PgPool;

use classtrack_core::types::{DbId, Timestamp};
use classtrack_db::models::activity::{Activity, CreateActivity};
use classtrack_db::models::instructor::{CreateInstructor, Instructor};
use classtrack_db::models::pay_rate::{CreatePayRate, PayRate};
use classtrack_db::models::schedule::{CreateSchedule, Schedule};
use classtrack_db::models::student::{CreateStudent, Student};
use classtrack_db::repositories::{
    ActivityRepo, InstructorRepo, PayRateRepo, ScheduleRepo, StudentRepo,
};
use classtrack_engine::channel::{ChannelError, NotificationChannel};
use classtrack_engine::EngineConfig;

/// A Monday morning, before any lesson of the day starts.
pub fn monday_morning() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Engine config with a UTC offset of zero and test-friendly windows.
pub fn test_config() -> EngineConfig {
    EngineConfig::default()
}

pub async fn seed_instructor(pool: &PgPool, name: &str, chat_id: Option<i64>) -> Instructor {
    InstructorRepo::create(
        pool,
        &CreateInstructor {
            full_name: name.to_string(),
            chat_id,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_student(pool: &PgPool, name: &str) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            full_name: name.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_activity(pool: &PgPool, name: &str, duration_minutes: Option<i32>) -> Activity {
    ActivityRepo::create(
        pool,
        &CreateActivity {
            name: name.to_string(),
            duration_minutes,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_schedule(
    pool: &PgPool,
    instructor_id: DbId,
    activity_id: Option<DbId>,
    weekday: i16,
    start: NaiveTime,
    end: NaiveTime,
) -> Schedule {
    ScheduleRepo::create(
        pool,
        &CreateSchedule {
            activity_id,
            instructor_id,
            weekday,
            start_time: start,
            end_time: end,
        },
    )
    .await
    .unwrap()
}

pub async fn enroll(pool: &PgPool, schedule_id: DbId, student_id: DbId) {
    ScheduleRepo::enroll(pool, schedule_id, student_id)
        .await
        .unwrap();
}

pub async fn seed_rate(pool: &PgPool, instructor_id: DbId, amount: i64) -> PayRate {
    PayRateRepo::create(
        pool,
        &CreatePayRate {
            instructor_id,
            amount: rust_decimal::Decimal::from(amount),
            effective_from: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            effective_to: None,
        },
    )
    .await
    .unwrap()
}

/// Channel that records every delivery and always succeeds.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Channel that rejects every delivery.
pub struct FailingChannel;

#[async_trait]
impl NotificationChannel for FailingChannel {
    async fn send(&self, _chat_id: i64, _text: &str) -> Result<(), ChannelError> {
        Err(ChannelError("simulated outage".into()))
    }
}
