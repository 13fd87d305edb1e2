pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /instructors                          list, create
/// /instructors/{id}                     get, update
///
/// /students                             list, create
/// /students/{id}                        get, set active flag
///
/// /activities                           list, create
/// /activities/{id}                      get
///
/// /schedules                            list, create
/// /schedules/{id}                       get, update (slot + instructor)
/// /schedules/{id}/deactivate            deactivate + cancel future events
/// /schedules/{id}/reactivate            reactivate + restore future events
/// /schedules/{id}/enrollments           enroll student
/// /schedules/{id}/enrollments/{sid}     unenroll student
/// /schedules/{id}/roster                current roster
///
/// /lesson-events                        list, create ad hoc
/// /lesson-events/{id}                   get
/// /lesson-events/{id}/cancel            cancel PLANNED event
/// /lesson-events/{id}/skip              skip PLANNED/SENT event
/// /lesson-events/{id}/reset             reset back to PLANNED
/// /lesson-events/{id}/attendance        record (POST), marks list (GET)
/// /lesson-events/{id}/summary           conducted-lesson summary
///
/// /conducted-lessons                    list (?unpaid=true)
///
/// /payroll-entries                      list
/// /payroll-entries/{id}                 get
/// /payroll-entries/{id}/approve         CALCULATED -> APPROVED
/// /payroll-entries/{id}/pay             APPROVED -> PAID
///
/// /pay-rates                            list (?instructor_id), create
///
/// /occurrences/generate                 run one generation cycle
/// /notifications/dispatch               run one dispatch cycle
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/instructors",
            get(handlers::instructors::list).post(handlers::instructors::create),
        )
        .route(
            "/instructors/{id}",
            get(handlers::instructors::get).patch(handlers::instructors::update),
        )
        .route(
            "/students",
            get(handlers::students::list).post(handlers::students::create),
        )
        .route(
            "/students/{id}",
            get(handlers::students::get).patch(handlers::students::set_active),
        )
        .route(
            "/activities",
            get(handlers::activities::list).post(handlers::activities::create),
        )
        .route("/activities/{id}", get(handlers::activities::get))
        .route(
            "/schedules",
            get(handlers::schedules::list).post(handlers::schedules::create),
        )
        .route(
            "/schedules/{id}",
            get(handlers::schedules::get).put(handlers::schedules::update),
        )
        .route(
            "/schedules/{id}/deactivate",
            post(handlers::schedules::deactivate),
        )
        .route(
            "/schedules/{id}/reactivate",
            post(handlers::schedules::reactivate),
        )
        .route(
            "/schedules/{id}/enrollments",
            post(handlers::schedules::enroll),
        )
        .route(
            "/schedules/{id}/enrollments/{student_id}",
            delete(handlers::schedules::unenroll),
        )
        .route("/schedules/{id}/roster", get(handlers::schedules::roster))
        .route(
            "/lesson-events",
            get(handlers::lesson_events::list).post(handlers::lesson_events::create_ad_hoc),
        )
        .route("/lesson-events/{id}", get(handlers::lesson_events::get))
        .route(
            "/lesson-events/{id}/cancel",
            post(handlers::lesson_events::cancel),
        )
        .route(
            "/lesson-events/{id}/skip",
            post(handlers::lesson_events::skip),
        )
        .route(
            "/lesson-events/{id}/reset",
            post(handlers::lesson_events::reset),
        )
        .route(
            "/lesson-events/{id}/attendance",
            get(handlers::lesson_events::list_attendance)
                .post(handlers::lesson_events::record_attendance),
        )
        .route(
            "/lesson-events/{id}/summary",
            get(handlers::lesson_events::get_summary),
        )
        .route("/conducted-lessons", get(handlers::conducted_lessons::list))
        .route("/payroll-entries", get(handlers::payroll::list))
        .route("/payroll-entries/{id}", get(handlers::payroll::get))
        .route(
            "/payroll-entries/{id}/approve",
            post(handlers::payroll::approve),
        )
        .route("/payroll-entries/{id}/pay", post(handlers::payroll::pay))
        .route(
            "/pay-rates",
            get(handlers::pay_rates::list).post(handlers::pay_rates::create),
        )
        .route(
            "/occurrences/generate",
            post(handlers::engine::generate_occurrences),
        )
        .route(
            "/notifications/dispatch",
            post(handlers::engine::dispatch_notifications),
        )
}
