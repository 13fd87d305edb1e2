//! Manual engine triggers.
//!
//! The worker binary runs the generator and dispatcher on intervals;
//! these endpoints run one cycle on demand, for operators and tests.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

use classtrack_engine::dispatcher::NotificationDispatcher;
use classtrack_engine::generator::OccurrenceGenerator;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/occurrences/generate
pub async fn generate_occurrences(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let generator = OccurrenceGenerator::new(state.pool.clone(), (*state.engine).clone());
    let report = generator.run_once(Utc::now()).await?;
    tracing::info!(
        created = report.created,
        already_existed = report.already_existed,
        "Manual generation cycle complete",
    );
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/notifications/dispatch
pub async fn dispatch_notifications(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dispatcher = NotificationDispatcher::new(
        state.pool.clone(),
        Arc::clone(&state.channel),
        (*state.engine).clone(),
    );
    let report = dispatcher.run_once(Utc::now()).await?;
    tracing::info!(
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        "Manual dispatch cycle complete",
    );
    Ok(Json(DataResponse { data: report }))
}
