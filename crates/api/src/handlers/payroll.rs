//! Handlers for the `/payroll-entries` resource.
//!
//! Entries move CALCULATED -> APPROVED -> PAID; each step is a
//! conditional update, so a stale transition maps to 409 rather than
//! silently re-applying.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use classtrack_core::error::CoreError;
use classtrack_core::types::DbId;
use classtrack_db::models::payroll::PayrollListQuery;
use classtrack_db::repositories::PayrollRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/payroll-entries
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PayrollListQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = PayrollRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/payroll-entries/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = PayrollRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "payroll_entry",
            id,
        })?;
    Ok(Json(DataResponse { data: entry }))
}

/// POST /api/v1/payroll-entries/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match PayrollRepo::approve(&state.pool, id).await? {
        Some(entry) => {
            tracing::info!(entry_id = id, "Payroll entry approved");
            Ok(Json(DataResponse { data: entry }))
        }
        None => {
            let current = PayrollRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "payroll_entry",
                    id,
                })?;
            Err(CoreError::InvalidTransition(format!(
                "cannot approve a {} entry",
                current.status
            ))
            .into())
        }
    }
}

/// POST /api/v1/payroll-entries/{id}/pay
pub async fn pay(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match PayrollRepo::mark_paid(&state.pool, id).await? {
        Some(entry) => {
            tracing::info!(entry_id = id, "Payroll entry paid");
            Ok(Json(DataResponse { data: entry }))
        }
        None => {
            let current = PayrollRepo::find_by_id(&state.pool, id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "payroll_entry",
                    id,
                })?;
            Err(CoreError::InvalidTransition(format!(
                "cannot pay a {} entry",
                current.status
            ))
            .into())
        }
    }
}
