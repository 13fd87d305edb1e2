//! Repository for the `instructors` table.

use sqlx::PgPool;

use classtrack_core::types::DbId;

use crate::models::instructor::{CreateInstructor, Instructor, UpdateInstructor};

const COLUMNS: &str = "id, full_name, chat_id, is_active, created_at, updated_at";

/// Provides persistence operations for instructors.
pub struct InstructorRepo;

impl InstructorRepo {
    pub async fn create(pool: &PgPool, input: &CreateInstructor) -> Result<Instructor, sqlx::Error> {
        let query = format!(
            "INSERT INTO instructors (full_name, chat_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Instructor>(&query)
            .bind(&input.full_name)
            .bind(input.chat_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Instructor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instructors WHERE id = $1");
        sqlx::query_as::<_, Instructor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Instructor>, sqlx::Error> {
        let query = if include_inactive {
            format!("SELECT {COLUMNS} FROM instructors ORDER BY full_name, id")
        } else {
            format!("SELECT {COLUMNS} FROM instructors WHERE is_active ORDER BY full_name, id")
        };
        sqlx::query_as::<_, Instructor>(&query).fetch_all(pool).await
    }

    /// Partial update. Unset fields keep their current value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInstructor,
    ) -> Result<Option<Instructor>, sqlx::Error> {
        let query = format!(
            "UPDATE instructors \
             SET full_name = COALESCE($2, full_name), \
                 chat_id = COALESCE($3, chat_id), \
                 is_active = COALESCE($4, is_active), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Instructor>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(input.chat_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
