//! Repository for the `activities` table.

use sqlx::{PgExecutor, PgPool};

use classtrack_core::types::DbId;

use crate::models::activity::{Activity, CreateActivity};

const COLUMNS: &str = "id, name, duration_minutes, is_active, created_at, updated_at";

/// Provides persistence operations for activities.
pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities (name, duration_minutes) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(&input.name)
            .bind(input.duration_minutes)
            .fetch_one(pool)
            .await
    }

    /// Takes any executor: the dispatcher reads the activity on its
    /// claiming transaction's connection.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Activity>, sqlx::Error> {
        let query = if include_inactive {
            format!("SELECT {COLUMNS} FROM activities ORDER BY name, id")
        } else {
            format!("SELECT {COLUMNS} FROM activities WHERE is_active ORDER BY name, id")
        };
        sqlx::query_as::<_, Activity>(&query).fetch_all(pool).await
    }
}
