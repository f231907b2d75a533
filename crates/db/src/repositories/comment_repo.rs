//! Repository for the `comments` table.

use sqlx::PgPool;
use stepdish_core::types::RecordId;

use crate::models::comment::{Comment, CreateComment};

const COLUMNS: &str = "id, recipe_id, author_id, content, created_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (recipe_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.recipe_id)
            .bind(input.author_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: RecordId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List comments on a recipe, oldest first.
    pub async fn list_by_recipe(
        pool: &PgPool,
        recipe_id: RecordId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE recipe_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(recipe_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a comment by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: RecordId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every comment on a recipe. Returns the number of rows removed.
    pub async fn delete_by_recipe(pool: &PgPool, recipe_id: RecordId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
