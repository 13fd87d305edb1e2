use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use classtrack_core::types::{DbId, Timestamp};

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a student.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
}
