use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use classtrack_core::types::{DbId, Timestamp};

/// A row from the `activities` table (a recurring class offering:
/// chess club, robotics, choir, ...).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub name: String,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an activity.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivity {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i32>,
}
