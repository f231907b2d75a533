//! Repository for the `recipe_steps` table.

use sqlx::{PgPool, Postgres, QueryBuilder};
use stepdish_core::types::RecordId;

use crate::models::recipe_step::{CreateRecipeStep, RecipeStep};

const COLUMNS: &str = "id, recipe_id, step_number, image_url, description, created_at";

/// Provides operations on the ordered steps of a recipe.
pub struct RecipeStepRepo;

impl RecipeStepRepo {
    /// List the steps of a recipe in sequence order.
    pub async fn list_by_recipe(
        pool: &PgPool,
        recipe_id: RecordId,
    ) -> Result<Vec<RecipeStep>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recipe_steps
             WHERE recipe_id = $1
             ORDER BY step_number ASC"
        );
        sqlx::query_as::<_, RecipeStep>(&query)
            .bind(recipe_id)
            .fetch_all(pool)
            .await
    }

    /// Insert all steps with a single multi-row statement.
    pub async fn create_many(
        pool: &PgPool,
        steps: &[CreateRecipeStep],
    ) -> Result<Vec<RecipeStep>, sqlx::Error> {
        if steps.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO recipe_steps (recipe_id, step_number, image_url, description) ",
        );
        qb.push_values(steps, |mut row, step| {
            row.push_bind(step.recipe_id)
                .push_bind(step.step_number)
                .push_bind(step.image_url.clone())
                .push_bind(step.description.clone());
        });
        qb.push(format!(" RETURNING {COLUMNS}"));

        let mut rows = qb.build_query_as::<RecipeStep>().fetch_all(pool).await?;
        // RETURNING order is not guaranteed to follow VALUES order.
        rows.sort_by_key(|s| s.step_number);
        Ok(rows)
    }

    /// Delete every step of a recipe. Returns the number of rows removed.
    pub async fn delete_by_recipe(pool: &PgPool, recipe_id: RecordId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
