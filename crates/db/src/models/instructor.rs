use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use classtrack_core::types::{DbId, Timestamp};

/// A row from the `instructors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Instructor {
    pub id: DbId,
    pub full_name: String,
    /// Notification chat ID. `None` means the dispatcher cannot reach
    /// this instructor yet.
    pub chat_id: Option<i64>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an instructor.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInstructor {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub chat_id: Option<i64>,
}

/// DTO for updating an instructor. All fields optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInstructor {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    pub chat_id: Option<i64>,
    pub is_active: Option<bool>,
}
