//! Repository for the `profiles` table.

use sqlx::PgPool;
use stepdish_core::types::RecordId;

use crate::models::profile::{Profile, UpsertProfile};

const COLUMNS: &str = "id, display_name, avatar_url, created_at";

/// Provides operations on user profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a profile, or replace the display fields of an existing one.
    pub async fn upsert(pool: &PgPool, input: &UpsertProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (id, display_name, avatar_url)
             VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                avatar_url = EXCLUDED.avatar_url
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.id)
            .bind(&input.display_name)
            .bind(&input.avatar_url)
            .fetch_one(pool)
            .await
    }

    /// Fetch the profiles with the given IDs. Missing IDs are skipped.
    pub async fn find_by_ids(pool: &PgPool, ids: &[RecordId]) -> Result<Vec<Profile>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = ANY($1)");
        sqlx::query_as::<_, Profile>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
