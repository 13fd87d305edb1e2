//! Repository for the `students` table.

use sqlx::PgPool;

use classtrack_core::types::DbId;

use crate::models::student::{CreateStudent, Student};

const COLUMNS: &str = "id, full_name, is_active, created_at, updated_at";

/// Provides persistence operations for students.
pub struct StudentRepo;

impl StudentRepo {
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<Student, sqlx::Error> {
        let query =
            format!("INSERT INTO students (full_name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Student>(&query)
            .bind(&input.full_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Student>, sqlx::Error> {
        let query = if include_inactive {
            format!("SELECT {COLUMNS} FROM students ORDER BY full_name, id")
        } else {
            format!("SELECT {COLUMNS} FROM students WHERE is_active ORDER BY full_name, id")
        };
        sqlx::query_as::<_, Student>(&query).fetch_all(pool).await
    }

    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!(
            "UPDATE students SET is_active = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
