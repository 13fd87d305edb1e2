//! Handlers for the `/pay-rates` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use classtrack_core::error::CoreError;
use classtrack_core::payrates::overlaps_existing;
use classtrack_core::types::DbId;
use classtrack_db::models::pay_rate::CreatePayRate;
use classtrack_db::repositories::{InstructorRepo, PayRateRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub instructor_id: DbId,
}

/// POST /api/v1/pay-rates
///
/// Rejects non-positive amounts, inverted ranges, and ranges that
/// overlap an existing rate for the same instructor.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePayRate>,
) -> AppResult<impl IntoResponse> {
    if input.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }
    if let Some(to) = input.effective_to {
        if to < input.effective_from {
            return Err(AppError::BadRequest(
                "effective_to must not precede effective_from".into(),
            ));
        }
    }

    InstructorRepo::find_by_id(&state.pool, input.instructor_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "instructor",
            id: input.instructor_id,
        })?;

    let existing: Vec<_> = PayRateRepo::list_for_instructor(&state.pool, input.instructor_id)
        .await?
        .iter()
        .map(|r| r.as_candidate())
        .collect();
    if overlaps_existing(&existing, input.effective_from, input.effective_to) {
        return Err(CoreError::Conflict(
            "rate range overlaps an existing rate for this instructor".into(),
        )
        .into());
    }

    let rate = PayRateRepo::create(&state.pool, &input).await?;
    tracing::info!(
        rate_id = rate.id,
        instructor_id = rate.instructor_id,
        "Pay rate created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: rate })))
}

/// GET /api/v1/pay-rates?instructor_id=...
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let rates = PayRateRepo::list_for_instructor(&state.pool, params.instructor_id).await?;
    Ok(Json(DataResponse { data: rates }))
}
