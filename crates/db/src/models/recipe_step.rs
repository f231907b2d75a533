//! Ordered step records (`recipe_steps` table).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stepdish_core::types::{RecordId, Timestamp};

/// A row from the `recipe_steps` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: RecordId,
    pub recipe_id: RecordId,
    /// 1-based position within the recipe.
    pub step_number: i32,
    pub image_url: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a step record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRecipeStep {
    pub recipe_id: RecordId,
    pub step_number: i32,
    pub image_url: String,
    pub description: Option<String>,
}

impl From<&RecipeStep> for CreateRecipeStep {
    fn from(step: &RecipeStep) -> Self {
        Self {
            recipe_id: step.recipe_id,
            step_number: step.step_number,
            image_url: step.image_url.clone(),
            description: step.description.clone(),
        }
    }
}
