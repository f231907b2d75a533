//! Repository for the `recipes` table.

use sqlx::{PgPool, Postgres, QueryBuilder};
use stepdish_core::types::RecordId;

use crate::models::recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, author_id, title, description, is_public, is_draft, \
                       cover_image_url, created_at, updated_at";

/// Provides CRUD operations for recipes.
pub struct RecipeRepo;

impl RecipeRepo {
    /// Insert a new recipe, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRecipe) -> Result<Recipe, sqlx::Error> {
        let query = format!(
            "INSERT INTO recipes
                (author_id, title, description, is_public, is_draft, cover_image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipe>(&query)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.is_public)
            .bind(input.is_draft)
            .bind(&input.cover_image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a recipe by its ID.
    pub async fn find_by_id(pool: &PgPool, id: RecordId) -> Result<Option<Recipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes WHERE id = $1");
        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List recipes matching `filter`, most recently created first.
    pub async fn list(pool: &PgPool, filter: &RecipeFilter) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM recipes WHERE TRUE"));

        if let Some(author_id) = filter.author_id {
            qb.push(" AND author_id = ").push_bind(author_id);
        }
        if filter.published_only {
            qb.push(" AND is_public = TRUE AND is_draft = FALSE");
        }
        if let Some(search) = &filter.title_search {
            qb.push(" AND title ILIKE ")
                .push_bind(contains_pattern(search))
                .push(" ESCAPE '\\'");
        }
        qb.push(" ORDER BY created_at DESC");

        qb.build_query_as::<Recipe>().fetch_all(pool).await
    }

    /// Replace the editable fields of a recipe and bump `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: RecordId,
        input: &UpdateRecipe,
    ) -> Result<Option<Recipe>, sqlx::Error> {
        let query = format!(
            "UPDATE recipes SET
                title = $2,
                description = $3,
                is_public = $4,
                is_draft = $5,
                cover_image_url = $6,
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.is_public)
            .bind(input.is_draft)
            .bind(&input.cover_image_url)
            .fetch_optional(pool)
            .await
    }

    /// Write back a previously read row, `updated_at` included.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn restore(pool: &PgPool, recipe: &Recipe) -> Result<Option<Recipe>, sqlx::Error> {
        let query = format!(
            "UPDATE recipes SET
                title = $2,
                description = $3,
                is_public = $4,
                is_draft = $5,
                cover_image_url = $6,
                updated_at = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipe>(&query)
            .bind(recipe.id)
            .bind(&recipe.title)
            .bind(&recipe.description)
            .bind(recipe.is_public)
            .bind(recipe.is_draft)
            .bind(&recipe.cover_image_url)
            .bind(recipe.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Flip a recipe between public and private.
    pub async fn set_visibility(
        pool: &PgPool,
        id: RecordId,
        is_public: bool,
    ) -> Result<Option<Recipe>, sqlx::Error> {
        let query = format!(
            "UPDATE recipes SET is_public = $2, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(is_public)
            .fetch_optional(pool)
            .await
    }

    /// Delete a recipe by ID. Returns `true` if a row was removed.
    ///
    /// Steps and comments are not touched.
    pub async fn delete(pool: &PgPool, id: RecordId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `ILIKE` pattern matching `search` literally anywhere in the title.
fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_search_is_wrapped() {
        assert_eq!(contains_pattern("tart"), "%tart%");
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\d"), "%c:\\\\d%");
    }
}
